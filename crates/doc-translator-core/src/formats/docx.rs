//! Word document (.docx) adapter.
//!
//! Paragraph and table-cell text runs across the whole document share one
//! dedup pool. Replacement happens at the text-run level, so formatting
//! boundaries inside a paragraph are preserved.

use std::path::Path;

use async_trait::async_trait;
use docx_rs::{
    Docx, DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild, read_docx,
};
use tracing::debug;

use super::FormatAdapter;
use crate::DocTranslator;
use crate::error::{Error, Result};
use crate::value::CellValue;

pub struct DocxAdapter;

#[async_trait]
impl FormatAdapter for DocxAdapter {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["docx"]
    }

    async fn translate_file(
        &self,
        translator: &DocTranslator,
        input: &Path,
        output: &Path,
    ) -> Result<()> {
        let bytes = std::fs::read(input).map_err(|e| Error::DocumentRead {
            path: input.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut docx =
            read_docx(&bytes).map_err(|e| Error::Docx(format!("{}: {e}", input.display())))?;

        let mut fragments = Vec::new();
        visit_texts(&mut docx, &mut |text| {
            fragments.push(CellValue::from(text.as_str()));
        });
        debug!(
            "Word document {}: {} text fragments",
            input.display(),
            fragments.len()
        );

        let translated = translator.translate_values(fragments).await;

        // Same traversal order as the collection pass
        let mut replacements = translated.into_iter();
        visit_texts(&mut docx, &mut |text| {
            if let Some(CellValue::Text(t)) = replacements.next() {
                *text = t;
            }
        });

        let file = std::fs::File::create(output).map_err(|e| Error::DocumentWrite {
            path: output.display().to_string(),
            reason: e.to_string(),
        })?;
        docx.build()
            .pack(file)
            .map_err(|e| Error::Docx(format!("{}: {e}", output.display())))?;
        Ok(())
    }
}

/// Visit every text run in the document body, paragraphs and tables alike.
fn visit_texts(docx: &mut Docx, f: &mut dyn FnMut(&mut String)) {
    for child in &mut docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => visit_paragraph(p, f),
            DocumentChild::Table(t) => visit_table(t, f),
            _ => {}
        }
    }
}

fn visit_paragraph(paragraph: &mut Paragraph, f: &mut dyn FnMut(&mut String)) {
    for child in &mut paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &mut run.children {
                if let RunChild::Text(text) = run_child {
                    f(&mut text.text);
                }
            }
        }
    }
}

fn visit_table(table: &mut Table, f: &mut dyn FnMut(&mut String)) {
    for row in &mut table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &mut row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &mut cell.children {
                match content {
                    TableCellContent::Paragraph(p) => visit_paragraph(p, f),
                    // Nested tables keep their cells in the same pool
                    TableCellContent::Table(t) => visit_table(t, f),
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Run, TableCell, TableRow};

    #[test]
    fn test_visit_reaches_paragraphs_and_table_cells() {
        let mut docx = Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("หนึ่ง")))
            .add_table(Table::new(vec![TableRow::new(vec![
                TableCell::new()
                    .add_paragraph(Paragraph::new().add_run(Run::new().add_text("สอง"))),
            ])]));

        let mut seen = Vec::new();
        visit_texts(&mut docx, &mut |s| seen.push(s.clone()));
        assert_eq!(seen, ["หนึ่ง", "สอง"]);
    }

    #[test]
    fn test_visit_rewrites_in_place() {
        let mut docx =
            Docx::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("เดิม")));

        visit_texts(&mut docx, &mut |s| *s = "replaced".to_string());

        let mut seen = Vec::new();
        visit_texts(&mut docx, &mut |s| seen.push(s.clone()));
        assert_eq!(seen, ["replaced"]);
    }
}
