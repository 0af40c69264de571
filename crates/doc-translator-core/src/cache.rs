//! Persistent translation cache.
//!
//! A JSON-file-backed map from exact source strings to their translations.
//! The file format is a single top-level JSON object with string keys and
//! string values and no metadata; callers that translate multiple language
//! pairs must point each pair at its own file.
//!
//! Keys are unnormalized: lookup is case- and whitespace-sensitive, and an
//! entry is never silently rewritten with a conflicting value during normal
//! operation (write-once-per-key in the happy path).
//!
//! The cache assumes a single owning process. Two batch jobs sharing one
//! cache file will race on save with last-write-wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default number of new entries between automatic saves.
pub const DEFAULT_AUTOSAVE_EVERY: usize = 100;

struct CacheState {
    entries: BTreeMap<String, String>,
    /// Inserts since the last successful save.
    pending: usize,
}

/// Persistent mapping from source text to translated text.
pub struct TranslationCache {
    path: Option<PathBuf>,
    autosave_every: usize,
    state: Mutex<CacheState>,
}

impl TranslationCache {
    /// Open a cache backed by `path`, loading any existing content.
    ///
    /// A missing file is a cold start. A corrupt or unreadable file is also
    /// a cold start, logged rather than raised: losing cached translations
    /// is recoverable, failing the whole batch is not.
    pub fn open(path: impl AsRef<Path>, autosave_every: usize) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = Self::load(&path);
        debug!(
            "Opened translation cache at {} ({} entries)",
            path.display(),
            entries.len()
        );

        Self {
            path: Some(path),
            autosave_every: autosave_every.max(1),
            state: Mutex::new(CacheState { entries, pending: 0 }),
        }
    }

    /// Cache with no backing file. `save` is a no-op.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            autosave_every: DEFAULT_AUTOSAVE_EVERY,
            state: Mutex::new(CacheState {
                entries: BTreeMap::new(),
                pending: 0,
            }),
        }
    }

    fn load(path: &Path) -> BTreeMap<String, String> {
        if !path.exists() {
            return BTreeMap::new();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        "Ignoring corrupt cache file {}: {} (starting cold)",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read cache file {}: {} (starting cold)",
                    path.display(),
                    e
                );
                BTreeMap::new()
            }
        }
    }

    /// Look up a cached translation. No side effects.
    pub fn get(&self, text: &str) -> Option<String> {
        self.lock().entries.get(text).cloned()
    }

    /// Store a translation, autosaving every `autosave_every` inserts.
    ///
    /// A failed autosave is logged and swallowed: the entry stays in memory
    /// and the next save attempt will retry the whole map.
    pub fn insert(&self, text: impl Into<String>, translation: impl Into<String>) {
        let due = {
            let mut state = self.lock();
            state.entries.insert(text.into(), translation.into());
            state.pending += 1;
            state.pending >= self.autosave_every
        };

        if due && let Err(e) = self.save() {
            warn!("Autosave of translation cache failed: {e}");
        }
    }

    /// Serialize the full in-memory map to the backing file as UTF-8 JSON.
    ///
    /// The pending counter resets only when the write succeeds, so a failed
    /// autosave is retried on the next insert rather than another
    /// `autosave_every` inserts later.
    pub fn save(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            self.lock().pending = 0;
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.lock().entries)
            .map_err(|e| Error::CacheWrite(e.to_string()))?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::CacheWrite(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        std::fs::write(path, json)
            .map_err(|e| Error::CacheWrite(format!("Failed to write {}: {e}", path.display())))?;

        self.lock().pending = 0;
        debug!("Saved translation cache to {}", path.display());
        Ok(())
    }

    /// Number of cached translations.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    #[allow(clippy::unwrap_used)]
    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        // Single-threaded pipeline, no panic while holding the lock.
        self.state.lock().unwrap()
    }
}
