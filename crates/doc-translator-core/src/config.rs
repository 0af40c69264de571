use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Language codes following ISO 639-1 with regional variants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// Serde default functions for the default language pair
fn default_source_lang() -> Lang {
    Lang::new("th")
}

fn default_target_lang() -> Lang {
    Lang::new("en")
}

/// An inclusive Unicode code-point range, used to configure the script
/// detector for source languages the built-in table does not cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRange {
    pub start: u32,
    pub end: u32,
}

impl CodeRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, c: char) -> bool {
        let cp = u32::from(c);
        cp >= self.start && cp <= self.end
    }
}

/// Translator backend configuration for OpenAI-compatible APIs.
///
/// Supports llama.cpp, Ollama, DeepSeek, OpenAI, and any other OpenAI-compatible API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl TranslatorConfig {
    /// Create a new translator config
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            api_key,
            model: model.into(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

const fn default_retry_count() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080/v1".to_string(),
            api_key: None,
            model: "default_model".to_string(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Translation cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable the persistent cache
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cache file path (defaults to translation-cache.json in the target directory)
    pub path: Option<PathBuf>,

    /// Automatically save after this many new entries
    #[serde(default = "default_autosave_every")]
    pub autosave_every: usize,
}

const fn default_true() -> bool {
    true
}

const fn default_autosave_every() -> usize {
    100
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            autosave_every: default_autosave_every(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source language
    #[serde(default = "default_source_lang")]
    pub source_lang: Lang,

    /// Target language
    #[serde(default = "default_target_lang")]
    pub target_lang: Lang,

    /// Explicit script ranges for the source language. When absent, the
    /// detector is derived from `source_lang`.
    #[serde(default)]
    pub script_ranges: Option<Vec<CodeRange>>,

    /// Minimum delay between outbound provider calls, in milliseconds
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,

    /// Translator backend configuration
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

const fn default_min_request_interval_ms() -> u64 {
    500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            script_ranges: None,
            min_request_interval_ms: default_min_request_interval_ms(),
            translator: TranslatorConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::error::Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::error::Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content)
            .map_err(|e| crate::error::Error::ConfigLoad(format!("Failed to parse config: {e}")))
    }

    /// Load from default locations (~/.config/doc-translator/config.toml, ./doc-translator.toml)
    pub fn load() -> Self {
        // Try user config
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("doc-translator").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Try local config
        let local_config = std::path::PathBuf::from("doc-translator.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./doc-translator.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./doc-translator.toml: {}", e);
                }
            }
        }

        // Return defaults
        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}

/// Default source language code
pub const DEFAULT_SOURCE_LANG: &str = "th";
/// Default target language code
pub const DEFAULT_TARGET_LANG: &str = "en";

/// File extensions processed by a batch run unless overridden.
pub const DEFAULT_EXTENSIONS: &[&str] = &["xlsx", "xls", "docx", "pdf", "csv", "txt"];
