//! Utility functions shared across the crate.

use std::path::{Path, PathBuf};

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Get the user's cache directory following XDG conventions.
///
/// Returns `$XDG_CACHE_HOME` if set, otherwise `$HOME/.cache`.
pub fn cache_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
}

/// Default cache file location inside a batch target directory.
///
/// Each language pair should use its own cache file; keeping the default
/// next to the translated output makes that the natural arrangement.
pub fn default_cache_file(target_dir: &Path) -> PathBuf {
    target_dir.join("translation-cache.json")
}

/// Lowercased extension of a path, without the leading dot.
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}
