//! Integration tests for doc-translator-core
//!
//! These tests verify the end-to-end workflow:
//! - Batch runs over a directory tree with mixed formats
//! - Unique-value dedup across real files
//! - Cache persistence between sessions and resume behavior
//! - Per-file failure isolation

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use doc_translator_core::{
    AppConfig, BatchOptions, BatchReport, CacheConfig, DocTranslator, Error, Lang, Result,
    TranslationCache, batch, translator::TranslatorInfo, Translator,
};

// =============================================================================
// Mock Translator for Testing
// =============================================================================

/// A mock translator that returns predictable translations without network
/// calls and counts how often the provider is hit.
struct MockTranslator {
    calls: AtomicUsize,
    should_fail: bool,
}

impl MockTranslator {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            should_fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            should_fail: true,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "mock",
            requires_api_key: false,
        }
    }

    async fn translate(&self, text: &str, _source: &Lang, _target: &Lang) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(Error::TranslationRequest(
                "Mock translation failure".to_string(),
            ));
        }
        Ok(format!("[en] {text}"))
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

fn test_config(cache_file: Option<&Path>) -> AppConfig {
    AppConfig {
        min_request_interval_ms: 0,
        cache: CacheConfig {
            enabled: cache_file.is_some(),
            path: cache_file.map(Path::to_path_buf),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn engine(mock: &Arc<MockTranslator>, cache_file: Option<&Path>) -> DocTranslator {
    DocTranslator::with_translator(
        Arc::clone(mock) as Arc<dyn Translator>,
        test_config(cache_file),
    )
    .expect("engine")
}

/// A small source tree: a CSV with duplicate values, a Thai text file and an
/// unreadable Word document stub.
fn write_source_tree(source: &Path) {
    std::fs::write(
        source.join("ข้อมูล.csv"),
        "ชื่อ,จำนวน\nแมว,1\nหมา,2\nแมว,3\n",
    )
    .unwrap();
    std::fs::write(source.join("notes.txt"), "สวัสดีชาวโลก").unwrap();
    std::fs::write(source.join("เอกสาร.docx"), b"stub").unwrap();
    std::fs::write(source.join("readme.md"), "not a translatable format").unwrap();
}

// =============================================================================
// Batch Tests
// =============================================================================

#[tokio::test]
async fn test_batch_translates_a_directory() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_source_tree(source.path());

    let mock = Arc::new(MockTranslator::new());
    let cache_file = target.path().join("translation-cache.json");
    let engine = engine(&mock, Some(&cache_file));

    let report = batch::translate_directory(
        &engine,
        source.path(),
        target.path(),
        &BatchOptions::default(),
        None,
    )
    .await
    .unwrap();

    // csv + txt translated; the docx stub is not a valid document;
    // readme.md not matched
    assert_eq!(
        report,
        BatchReport {
            translated: 2,
            skipped: 0,
            failed: 1,
        }
    );

    // File names with source-script content are translated, extension kept
    let csv_out = target.path().join("[en] ข้อมูล.csv");
    assert!(csv_out.exists());
    assert!(target.path().join("notes.txt").exists());

    // Headers and body share one pool; duplicates cost one call
    let content = std::fs::read_to_string(&csv_out).unwrap();
    assert!(content.contains("[en] ชื่อ"));
    assert!(content.contains("[en] แมว"));
    assert!(content.contains("[en] หมา"));
    // Numeric cells pass through
    assert!(content.contains('1') && content.contains('2') && content.contains('3'));

    // Distinct provider work: 4 CSV strings + csv stem + docx stem + txt body
    assert_eq!(mock.calls(), 7);

    // The batch saved the cache at the end
    let reloaded = TranslationCache::open(&cache_file, 100);
    assert_eq!(reloaded.get("แมว"), Some("[en] แมว".to_string()));
    assert_eq!(reloaded.get("สวัสดีชาวโลก"), Some("[en] สวัสดีชาวโลก".to_string()));
}

#[tokio::test]
async fn test_second_run_skips_existing_outputs() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_source_tree(source.path());

    let mock = Arc::new(MockTranslator::new());
    let cache_file = target.path().join("translation-cache.json");
    let engine = engine(&mock, Some(&cache_file));

    let options = BatchOptions::default();
    let first = batch::translate_directory(&engine, source.path(), target.path(), &options, None)
        .await
        .unwrap();
    assert_eq!(first.translated, 2);
    let calls_after_first = mock.calls();

    let second = batch::translate_directory(&engine, source.path(), target.path(), &options, None)
        .await
        .unwrap();

    // Outputs exist, so no adapter runs; the unreadable docx fails again
    assert_eq!(
        second,
        BatchReport {
            translated: 0,
            skipped: 2,
            failed: 1,
        }
    );
    // Path recomputation is served from cache: zero new provider calls
    assert_eq!(mock.calls(), calls_after_first);
}

#[tokio::test]
async fn test_resume_across_sessions_reuses_cache() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("a.txt"), "สวัสดี").unwrap();

    let cache_file = target.path().join("translation-cache.json");
    let options = BatchOptions::default();

    let first_mock = Arc::new(MockTranslator::new());
    let first_engine = engine(&first_mock, Some(&cache_file));
    batch::translate_directory(&first_engine, source.path(), target.path(), &options, None)
        .await
        .unwrap();
    assert_eq!(first_mock.calls(), 1);

    // New session, same cache file, new identical source file
    std::fs::write(source.path().join("b.txt"), "สวัสดี").unwrap();
    let second_mock = Arc::new(MockTranslator::new());
    let second_engine = engine(&second_mock, Some(&cache_file));
    let report =
        batch::translate_directory(&second_engine, source.path(), target.path(), &options, None)
            .await
            .unwrap();

    assert_eq!(report.translated, 1);
    assert_eq!(report.skipped, 1);
    // b.txt's content was already cached by the first session
    assert_eq!(second_mock.calls(), 0);
}

#[tokio::test]
async fn test_provider_failure_keeps_documents_whole() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("data.csv"), "แมว,1\nหมา,2\n").unwrap();

    let mock = Arc::new(MockTranslator::failing());
    let engine = engine(&mock, None);

    let report = batch::translate_directory(
        &engine,
        source.path(),
        target.path(),
        &BatchOptions::default(),
        None,
    )
    .await
    .unwrap();

    // The file is written with its original text, not dropped
    assert_eq!(report.translated, 1);
    let content = std::fs::read_to_string(target.path().join("data.csv")).unwrap();
    assert!(content.contains("แมว"));
    assert!(content.contains("หมา"));
}

#[tokio::test]
async fn test_non_recursive_ignores_subdirectories() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("top.txt"), "สวัสดี").unwrap();
    std::fs::create_dir(source.path().join("nested")).unwrap();
    std::fs::write(source.path().join("nested/inner.txt"), "สวัสดี").unwrap();

    let mock = Arc::new(MockTranslator::new());
    let engine = engine(&mock, None);

    let options = BatchOptions {
        recursive: false,
        ..Default::default()
    };
    let report = batch::translate_directory(&engine, source.path(), target.path(), &options, None)
        .await
        .unwrap();

    assert_eq!(report.total(), 1);
    assert!(target.path().join("top.txt").exists());
    assert!(!target.path().join("nested").exists());
}

#[tokio::test]
async fn test_recursive_run_translates_directory_names() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    std::fs::create_dir(source.path().join("รายงาน")).unwrap();
    std::fs::write(source.path().join("รายงาน/q1.txt"), "สวัสดี").unwrap();

    let mock = Arc::new(MockTranslator::new());
    let engine = engine(&mock, None);

    let report = batch::translate_directory(
        &engine,
        source.path(),
        target.path(),
        &BatchOptions::default(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.translated, 1);
    assert!(target.path().join("[en] รายงาน/q1.txt").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_subdirectory_does_not_abort_the_batch() {
    use std::os::unix::fs::PermissionsExt;

    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("a.txt"), "สวัสดี").unwrap();
    let locked = source.path().join("locked");
    std::fs::create_dir(&locked).unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    let mock = Arc::new(MockTranslator::new());
    let engine = engine(&mock, None);

    let report = batch::translate_directory(
        &engine,
        source.path(),
        target.path(),
        &BatchOptions::default(),
        None,
    )
    .await
    .expect("unreadable subdirectory must not abort the run");

    assert_eq!(report.translated, 1);
    assert!(target.path().join("a.txt").exists());

    // Restore so the tempdir can clean up
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[tokio::test]
async fn test_progress_callback_counts_every_file() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_source_tree(source.path());

    let mock = Arc::new(MockTranslator::new());
    let engine = engine(&mock, None);

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_in_callback = Arc::clone(&seen);
    let report = batch::translate_directory(
        &engine,
        source.path(),
        target.path(),
        &BatchOptions::default(),
        Some(Box::new(move |done, total| {
            seen_in_callback.lock().unwrap().push((done, total));
        })),
    )
    .await
    .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), report.total());
    assert_eq!(*seen.last().unwrap(), (report.total(), report.total()));
}

// =============================================================================
// Word Document Tests (docx feature)
// =============================================================================

#[cfg(feature = "docx")]
mod docx {
    use super::*;
    use doc_translator_core::formats;
    use docx_rs::{
        Docx, DocumentChild, Paragraph, ParagraphChild, Run, RunChild, Table, TableCell,
        TableCellContent, TableChild, TableRow, TableRowChild, read_docx,
    };

    /// A paragraph, an English paragraph and a table whose two cells share
    /// one value.
    fn write_fixture_document(path: &Path) {
        let docx = Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("สวัสดีชาวโลก")))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("plain english")))
            .add_table(Table::new(vec![TableRow::new(vec![
                TableCell::new()
                    .add_paragraph(Paragraph::new().add_run(Run::new().add_text("แมว"))),
                TableCell::new()
                    .add_paragraph(Paragraph::new().add_run(Run::new().add_text("แมว"))),
            ])]));
        let file = std::fs::File::create(path).unwrap();
        docx.build().pack(file).unwrap();
    }

    fn collect_texts(path: &Path) -> Vec<String> {
        let bytes = std::fs::read(path).unwrap();
        let docx = read_docx(&bytes).unwrap();
        let mut texts = Vec::new();
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => collect_paragraph(p, &mut texts),
                DocumentChild::Table(t) => collect_table(t, &mut texts),
                _ => {}
            }
        }
        texts
    }

    fn collect_paragraph(paragraph: &Paragraph, out: &mut Vec<String>) {
        for child in &paragraph.children {
            if let ParagraphChild::Run(run) = child {
                for run_child in &run.children {
                    if let RunChild::Text(text) = run_child {
                        out.push(text.text.clone());
                    }
                }
            }
        }
    }

    fn collect_table(table: &Table, out: &mut Vec<String>) {
        for row in &table.rows {
            let TableChild::TableRow(row) = row;
            for cell in &row.cells {
                let TableRowChild::TableCell(cell) = cell;
                for content in &cell.children {
                    match content {
                        TableCellContent::Paragraph(p) => collect_paragraph(p, out),
                        TableCellContent::Table(t) => collect_table(t, out),
                        _ => {}
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_word_document_round_trip_translates_paragraphs_and_cells() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        let output = dir.path().join("out.docx");
        write_fixture_document(&input);

        let mock = Arc::new(MockTranslator::new());
        let engine = engine(&mock, None);

        let adapter = formats::adapter_for("docx").unwrap();
        adapter
            .translate_file(&engine, &input, &output)
            .await
            .unwrap();

        // The duplicate cell collapses and the English paragraph is skipped
        assert_eq!(mock.calls(), 2);

        let texts = collect_texts(&output);
        assert!(texts.contains(&"[en] สวัสดีชาวโลก".to_string()));
        assert!(texts.contains(&"plain english".to_string()));
        assert_eq!(texts.iter().filter(|t| *t == "[en] แมว").count(), 2);
    }
}

// =============================================================================
// Spreadsheet Tests (xlsx feature)
// =============================================================================

#[cfg(feature = "xlsx")]
mod xlsx {
    use super::*;
    use calamine::{Data, Reader, open_workbook_auto};
    use doc_translator_core::formats;

    fn write_fixture_workbook(path: &Path) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let first = workbook.add_worksheet();
        first.set_name("แผ่นหนึ่ง").unwrap();
        first.write_string(0, 0, "ยอดรวม").unwrap();
        first.write_number(0, 1, 42.0).unwrap();
        let second = workbook.add_worksheet();
        second.set_name("แผ่นสอง").unwrap();
        second.write_string(0, 0, "ยอดรวม").unwrap();
        second.write_string(1, 0, "หมายเหตุ").unwrap();
        workbook.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_workbook_round_trip_with_cross_sheet_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.xlsx");
        let output = dir.path().join("out.xlsx");
        write_fixture_workbook(&input);

        let mock = Arc::new(MockTranslator::new());
        let engine = engine(&mock, None);

        let adapter = formats::adapter_for("xlsx").unwrap();
        adapter
            .translate_file(&engine, &input, &output)
            .await
            .unwrap();

        // "ยอดรวม" shared by both sheets: one call; plus "หมายเหตุ" and
        // the two sheet names
        assert_eq!(mock.calls(), 4);

        let mut out = open_workbook_auto(&output).unwrap();
        let names = out.sheet_names().to_owned();
        assert_eq!(names, ["[en] แผ่นหนึ่ง", "[en] แผ่นสอง"]);

        let range = out.worksheet_range("[en] แผ่นหนึ่ง").unwrap();
        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("[en] ยอดรวม".to_string()))
        );
        assert_eq!(range.get_value((0, 1)), Some(&Data::Float(42.0)));

        let range = out.worksheet_range("[en] แผ่นสอง").unwrap();
        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("[en] ยอดรวม".to_string()))
        );
    }
}
