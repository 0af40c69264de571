//! Spreadsheet adapter (.xlsx / .xls).
//!
//! Every sheet is loaded before any translation happens, so the dedup pool
//! spans the whole workbook, sheet names included. The first row is data,
//! not headers. Output is always written in xlsx format.

use std::path::Path;

use async_trait::async_trait;
use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::Workbook;
use tracing::{debug, warn};

use super::FormatAdapter;
use crate::DocTranslator;
use crate::error::{Error, Result};
use crate::value::{CellValue, Sheet};

pub struct SpreadsheetAdapter;

#[async_trait]
impl FormatAdapter for SpreadsheetAdapter {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xlsx", "xls"]
    }

    async fn translate_file(
        &self,
        translator: &DocTranslator,
        input: &Path,
        output: &Path,
    ) -> Result<()> {
        let sheets = read_workbook(input)?;
        debug!(
            "Workbook {} has {} sheets",
            input.display(),
            sheets.len()
        );

        let translated = translator.translate_workbook(sheets).await;
        write_workbook(&translated, output)
    }
}

fn read_workbook(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| Error::SpreadsheetRead(format!("{}: {e}", path.display())))?;

    let names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| Error::SpreadsheetRead(format!("{}!{name}: {e}", path.display())))?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();
        sheets.push(Sheet::new(name, rows));
    }
    Ok(sheets)
}

fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        // Dates and durations are preserved as-is, never translated
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn write_workbook(sheets: &[Sheet], output: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        if let Err(e) = worksheet.set_name(&sheet.name) {
            // Translated names can exceed Excel's 31-char limit or collide;
            // the default "SheetN" name keeps the workbook writable
            warn!("Cannot use sheet name '{}': {e}", sheet.name);
        }

        for (r, row) in sheet.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                let written = match cell {
                    CellValue::Empty => Ok(&mut *worksheet),
                    CellValue::Text(s) => worksheet.write_string(r, c, s),
                    CellValue::Number(n) => worksheet.write_number(r, c, *n),
                    #[allow(clippy::cast_precision_loss)]
                    CellValue::Int(i) => worksheet.write_number(r, c, *i as f64),
                    CellValue::Bool(b) => worksheet.write_boolean(r, c, *b),
                };
                written.map_err(|e| Error::SpreadsheetWrite(e.to_string()))?;
            }
        }
    }

    workbook
        .save(output)
        .map_err(|e| Error::SpreadsheetWrite(format!("{}: {e}", output.display())))?;
    Ok(())
}
