//! PDF adapter.
//!
//! Rebuilding a PDF with translated text in place is a non-goal: layout,
//! fonts and encoding make faithful replacement impractical here. The
//! adapter extracts each page's text, runs it through the translation
//! pipeline (so every page's translation lands in the cache), and writes a
//! structural copy of the original document to the output path.

use std::path::Path;

use async_trait::async_trait;
use lopdf::Document;
use tracing::warn;

use super::FormatAdapter;
use crate::DocTranslator;
use crate::error::{Error, Result};
use crate::value::CellValue;

pub struct PdfAdapter;

#[async_trait]
impl FormatAdapter for PdfAdapter {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    async fn translate_file(
        &self,
        translator: &DocTranslator,
        input: &Path,
        output: &Path,
    ) -> Result<()> {
        let mut doc = Document::load(input)
            .map_err(|e| Error::Pdf(format!("{}: {e}", input.display())))?;

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let mut pages = Vec::with_capacity(page_numbers.len());
        for page in &page_numbers {
            match doc.extract_text(&[*page]) {
                Ok(text) => pages.push(CellValue::from(text)),
                Err(e) => {
                    warn!("Cannot extract text from page {page}: {e}");
                    pages.push(CellValue::Empty);
                }
            }
        }

        // Populates the cache page by page; identical pages cost one call
        translator.translate_values(pages).await;

        doc.save(output)
            .map_err(|e| Error::Pdf(format!("{}: {e}", output.display())))?;

        warn!(
            "PDF output {} preserves the original structure; translated text \
             is available in the cache but not substituted into the pages",
            output.display()
        );
        Ok(())
    }
}
