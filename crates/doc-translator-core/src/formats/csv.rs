//! CSV adapter.
//!
//! Headers and body cells share one dedup pool per file: a string that
//! appears both as a header and as a cell value is translated once.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::FormatAdapter;
use crate::DocTranslator;
use crate::error::{Error, Result};
use crate::value::CellValue;

pub struct CsvAdapter;

#[async_trait]
impl FormatAdapter for CsvAdapter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }

    async fn translate_file(
        &self,
        translator: &DocTranslator,
        input: &Path,
        output: &Path,
    ) -> Result<()> {
        // No header inference: the first row is just the first row, and it
        // deduplicates against the body like any other record.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(input)
            .map_err(|e| Error::Csv(format!("{}: {e}", input.display())))?;

        let mut row_lengths = Vec::new();
        let mut cells = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::Csv(format!("{}: {e}", input.display())))?;
            row_lengths.push(record.len());
            cells.extend(record.iter().map(CellValue::from));
        }

        debug!(
            "CSV {}: {} rows, {} cells",
            input.display(),
            row_lengths.len(),
            cells.len()
        );

        let translated = translator.translate_values(cells).await;

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(output)
            .map_err(|e| Error::Csv(format!("{}: {e}", output.display())))?;

        let mut remaining = translated.into_iter();
        for len in row_lengths {
            let row: Vec<String> = remaining.by_ref().take(len).map(|v| v.to_string()).collect();
            writer
                .write_record(&row)
                .map_err(|e| Error::Csv(format!("{}: {e}", output.display())))?;
        }
        writer.flush()?;

        Ok(())
    }
}
