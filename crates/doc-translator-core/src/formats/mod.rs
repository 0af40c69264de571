//! Format adapters.
//!
//! Each adapter knows how to pull translatable strings out of one document
//! format, run them through the shared [`DocTranslator`], and write a new
//! document of the same format. The dedup/caching core never touches file
//! formats; adapters never talk to the provider directly.

mod csv;
#[cfg(feature = "docx")]
mod docx;
#[cfg(feature = "pdf")]
mod pdf;
mod txt;
#[cfg(feature = "xlsx")]
mod xlsx;

pub use csv::CsvAdapter;
#[cfg(feature = "docx")]
pub use docx::DocxAdapter;
#[cfg(feature = "pdf")]
pub use pdf::PdfAdapter;
pub use txt::TxtAdapter;
#[cfg(feature = "xlsx")]
pub use xlsx::SpreadsheetAdapter;

use std::path::Path;

use async_trait::async_trait;

use crate::DocTranslator;
use crate::error::{Error, Result};

/// Translates one file of a specific format.
#[async_trait]
pub trait FormatAdapter: Send + Sync {
    /// Short name for logs and reports
    fn name(&self) -> &'static str;

    /// Extensions (lowercase, no dot) this adapter handles
    fn extensions(&self) -> &'static [&'static str];

    /// Read `input`, translate its text content, write `output`.
    async fn translate_file(
        &self,
        translator: &DocTranslator,
        input: &Path,
        output: &Path,
    ) -> Result<()>;
}

/// Look up the adapter for a lowercase file extension.
///
/// Formats the build knows about but cannot handle (feature disabled, or no
/// adapter shipped at all, as for legacy `.doc` files) report
/// [`Error::AdapterUnavailable`]; anything else is [`Error::UnsupportedFormat`].
pub fn adapter_for(extension: &str) -> Result<&'static dyn FormatAdapter> {
    match extension {
        "csv" => Ok(&CsvAdapter),
        "txt" => Ok(&TxtAdapter),
        #[cfg(feature = "xlsx")]
        "xlsx" | "xls" => Ok(&SpreadsheetAdapter),
        #[cfg(not(feature = "xlsx"))]
        "xlsx" | "xls" => Err(Error::AdapterUnavailable {
            format: "spreadsheet",
            hint: "rebuild with the 'xlsx' feature",
        }),
        #[cfg(feature = "pdf")]
        "pdf" => Ok(&PdfAdapter),
        #[cfg(not(feature = "pdf"))]
        "pdf" => Err(Error::AdapterUnavailable {
            format: "PDF",
            hint: "rebuild with the 'pdf' feature",
        }),
        #[cfg(feature = "docx")]
        "docx" => Ok(&DocxAdapter),
        #[cfg(not(feature = "docx"))]
        "docx" => Err(Error::AdapterUnavailable {
            format: "word document",
            hint: "rebuild with the 'docx' feature",
        }),
        // Legacy binary format, no pure-Rust reader
        "doc" => Err(Error::AdapterUnavailable {
            format: "legacy word document",
            hint: "convert .doc files to .docx",
        }),
        other => Err(Error::UnsupportedFormat(format!(".{other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_formats_resolve() {
        assert_eq!(adapter_for("csv").unwrap().name(), "csv");
        assert_eq!(adapter_for("txt").unwrap().name(), "txt");
        #[cfg(feature = "xlsx")]
        assert_eq!(adapter_for("xlsx").unwrap().name(), "spreadsheet");
        #[cfg(feature = "pdf")]
        assert_eq!(adapter_for("pdf").unwrap().name(), "pdf");
        #[cfg(feature = "docx")]
        assert_eq!(adapter_for("docx").unwrap().name(), "docx");
    }

    #[test]
    fn test_legacy_doc_is_reported_unavailable() {
        assert!(matches!(
            adapter_for("doc"),
            Err(Error::AdapterUnavailable { .. })
        ));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        assert!(matches!(
            adapter_for("odt"),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
