use thiserror::Error;

/// Unified error type for doc-translator-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Format dispatch (unknown extension, adapter not compiled in)
/// - Document I/O (reading and writing the supported formats)
/// - Translation operations (API requests, responses, rate limiting)
/// - Cache persistence
/// - Configuration loading and validation
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Format Dispatch Errors
    // ==========================================================================
    /// No adapter exists for this file extension
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// An adapter exists for this format but is not available in this build
    #[error("no {format} support available: {hint}")]
    AdapterUnavailable {
        format: &'static str,
        hint: &'static str,
    },

    // ==========================================================================
    // Document Errors
    // ==========================================================================
    /// Failed to read a source document
    #[error("failed to read {path}: {reason}")]
    DocumentRead { path: String, reason: String },

    /// Failed to write a translated document
    #[error("failed to write {path}: {reason}")]
    DocumentWrite { path: String, reason: String },

    /// Failed to parse a CSV file
    #[error("CSV error: {0}")]
    Csv(String),

    /// Failed to read a spreadsheet workbook
    #[error("spreadsheet read error: {0}")]
    SpreadsheetRead(String),

    /// Failed to write a spreadsheet workbook
    #[error("spreadsheet write error: {0}")]
    SpreadsheetWrite(String),

    /// Failed to read or extract text from a PDF
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Failed to read or rebuild a Word document
    #[error("Word document error: {0}")]
    Docx(String),

    // ==========================================================================
    // Translation Errors
    // ==========================================================================
    /// Translation API request failed
    #[error("translation API request failed: {0}")]
    TranslationRequest(String),

    /// Invalid response from translation API
    #[error("invalid translation API response: {0}")]
    TranslationInvalidResponse(String),

    /// Rate limited by translation API
    #[error("translation rate limited{}", retry_after.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    TranslationRateLimited { retry_after: Option<u64> },

    /// Translation request timed out
    #[error("translation request timed out")]
    TranslationTimeout,

    /// Maximum retry attempts exceeded for translation
    #[error("translation failed after maximum retries")]
    TranslationMaxRetriesExceeded,

    // ==========================================================================
    // Cache Errors
    // ==========================================================================
    /// Failed to persist the translation cache
    #[error("failed to write translation cache: {0}")]
    CacheWrite(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
