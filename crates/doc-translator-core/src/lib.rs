//! Doc Translator Core Library
//!
//! This library provides the core functionality for batch-translating
//! documents (spreadsheets, CSVs, PDFs, plain text):
//! - Source-script detection (translate only what needs translating)
//! - A persistent JSON translation cache
//! - A rate-limited adapter over OpenAI-compatible translation APIs
//! - Unique-value extraction, so a document with many repeated strings
//!   costs one provider call per distinct string
//! - Format adapters and a directory batch orchestrator

pub mod batch;
pub mod cache;
pub mod config;
pub mod dedup;
pub mod error;
pub mod formats;
pub mod script;
pub mod translator;
pub mod util;
pub mod value;

pub use batch::{BatchOptions, BatchReport, translate_directory};
pub use cache::TranslationCache;
pub use config::{
    AppConfig, CacheConfig, CodeRange, DEFAULT_EXTENSIONS, DEFAULT_SOURCE_LANG,
    DEFAULT_TARGET_LANG, Lang, TranslatorConfig,
};
pub use error::{Error, Result};
pub use formats::FormatAdapter;
pub use script::ScriptDetector;
pub use translator::{OpenAiTranslator, Translator, create_translator};
pub use value::{CellValue, Sheet};

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, error};

use dedup::UniqueIndex;

/// Where the text in a [`Translated`] came from.
///
/// Callers that need to distinguish "already in the target language" from
/// "translation attempted and failed" get the answer here instead of
/// re-deriving it from cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Fresh translation from the provider, now cached.
    Provider,
    /// Served from the cache; no provider call, no delay.
    Cache,
    /// Not eligible for translation; returned verbatim.
    Skipped,
    /// Provider error; original text returned so the document stays whole.
    Failed,
}

/// Result of translating a single string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    pub text: String,
    pub origin: Origin,
}

impl Translated {
    fn passthrough(text: &str, origin: Origin) -> Self {
        Self {
            text: text.to_string(),
            origin,
        }
    }

    /// The output text, however it was produced.
    pub fn into_text(self) -> String {
        self.text
    }

    /// True when the text is in the target language (fresh or cached).
    pub fn was_translated(&self) -> bool {
        matches!(self.origin, Origin::Provider | Origin::Cache)
    }
}

/// High-level document translator combining the script detector, the
/// persistent cache and a rate-limited translation provider.
///
/// One instance owns the cache for the duration of a batch job; every
/// format adapter and the batch orchestrator borrow it rather than holding
/// their own copies.
pub struct DocTranslator {
    translator: Arc<dyn Translator>,
    cache: TranslationCache,
    detector: ScriptDetector,
    config: AppConfig,
    min_interval: Duration,
    /// Time of the last outbound provider call. Cache hits do not touch it.
    last_request: Mutex<Option<Instant>>,
}

impl DocTranslator {
    /// Create a new translator with the given configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        let translator = create_translator(&config.translator)?;
        Self::with_translator(translator, config)
    }

    /// Create with a custom provider (tests, alternative backends)
    pub fn with_translator(translator: Arc<dyn Translator>, config: AppConfig) -> Result<Self> {
        let cache = match (config.cache.enabled, &config.cache.path) {
            (true, Some(path)) => TranslationCache::open(path, config.cache.autosave_every),
            _ => TranslationCache::in_memory(),
        };

        let detector = match &config.script_ranges {
            Some(ranges) if !ranges.is_empty() => ScriptDetector::new(ranges.clone()),
            _ => ScriptDetector::for_lang(&config.source_lang),
        };

        let min_interval = Duration::from_millis(config.min_request_interval_ms);

        Ok(Self {
            translator,
            cache,
            detector,
            config,
            min_interval,
            last_request: Mutex::new(None),
        })
    }

    /// Translate one string: detector gate, then cache, then provider.
    ///
    /// Never fails. A provider error is logged and the original text comes
    /// back with [`Origin::Failed`] — one bad string must not abort a
    /// whole-file job.
    pub async fn translate_text(&self, text: &str) -> Translated {
        if !self.detector.should_translate(text) {
            return Translated::passthrough(text, Origin::Skipped);
        }

        if let Some(cached) = self.cache.get(text) {
            debug!("Cache hit for '{}'", preview(text));
            return Translated {
                text: cached,
                origin: Origin::Cache,
            };
        }

        self.pace().await;

        let result = self
            .translator
            .translate(text, &self.config.source_lang, &self.config.target_lang)
            .await;
        self.mark_request();

        match result {
            Ok(translated) => {
                self.cache.insert(text, translated.clone());
                Translated {
                    text: translated,
                    origin: Origin::Provider,
                }
            }
            Err(e) => {
                error!("Failed to translate '{}': {e}", preview(text));
                Translated::passthrough(text, Origin::Failed)
            }
        }
    }

    /// Translate a flat sequence of values via unique-value extraction.
    ///
    /// The output has the same length and order as the input. Each distinct
    /// translatable string is resolved once (cache or provider) in
    /// first-seen order and broadcast to every position holding it; empty,
    /// numeric and boolean positions pass through untouched.
    pub async fn translate_values(&self, values: Vec<CellValue>) -> Vec<CellValue> {
        let mut index = UniqueIndex::new();
        for (i, value) in values.iter().enumerate() {
            if let Some(text) = value.translatable() {
                index.observe(text, i);
            }
        }

        debug!(
            "Translating {} distinct values across {} positions",
            index.len(),
            values.len()
        );

        let mut out = values;
        for entry in index.entries() {
            let translated = self.translate_text(&entry.value).await.into_text();
            for &i in &entry.positions {
                out[i] = CellValue::Text(translated.clone());
            }
        }
        out
    }

    /// Translate a whole workbook with one dedup pool across every sheet's
    /// cells and the sheet names, so a value repeated on several sheets is
    /// translated exactly once.
    pub async fn translate_workbook(&self, sheets: Vec<Sheet>) -> Vec<Sheet> {
        let mut index: UniqueIndex<WorkbookPos> = UniqueIndex::new();

        for (s, sheet) in sheets.iter().enumerate() {
            if !sheet.name.trim().is_empty() {
                index.observe(&sheet.name, WorkbookPos::SheetName(s));
            }
            for (r, row) in sheet.rows.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    if let Some(text) = cell.translatable() {
                        index.observe(text, WorkbookPos::Cell { sheet: s, row: r, col: c });
                    }
                }
            }
        }

        debug!(
            "Workbook has {} distinct values across {} sheets",
            index.len(),
            sheets.len()
        );

        let mut out = sheets;
        for entry in index.entries() {
            let translated = self.translate_text(&entry.value).await.into_text();
            for pos in &entry.positions {
                match *pos {
                    WorkbookPos::SheetName(s) => out[s].name = translated.clone(),
                    WorkbookPos::Cell { sheet, row, col } => {
                        out[sheet].rows[row][col] = CellValue::Text(translated.clone());
                    }
                }
            }
        }
        out
    }

    /// Persist the cache now. Autosaves also happen during `translate_text`.
    pub fn save_cache(&self) -> Result<()> {
        self.cache.save()
    }

    pub const fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn translator_info(&self) -> translator::TranslatorInfo {
        self.translator.info()
    }

    /// Block until at least `min_interval` has passed since the last
    /// outbound provider call. Sequential by design: the stall is the
    /// rate limit.
    async fn pace(&self) {
        let wait = {
            let last = self.lock_last();
            last.and_then(|at| self.min_interval.checked_sub(at.elapsed()))
        };
        if let Some(delay) = wait
            && !delay.is_zero()
        {
            debug!("Rate limit: sleeping {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }

    fn mark_request(&self) {
        #[allow(clippy::unwrap_used)]
        let mut last = self.last_request.lock().unwrap();
        *last = Some(Instant::now());
    }

    #[allow(clippy::unwrap_used)]
    fn lock_last(&self) -> Option<Instant> {
        // Single-threaded pipeline, no panic while holding the lock.
        *self.last_request.lock().unwrap()
    }
}

/// Position of one occurrence inside a workbook-level dedup pool.
#[derive(Debug, Clone, Copy)]
enum WorkbookPos {
    SheetName(usize),
    Cell { sheet: usize, row: usize, col: usize },
}

/// First characters of a string for log lines, respecting char boundaries.
fn preview(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{head}...")
    }
}
