//! Batch orchestrator.
//!
//! Walks a source tree, mirrors its structure under the target directory
//! with translated directory and file names, and dispatches each file to
//! its format adapter. One cache serves the whole run and is saved at the
//! end. No per-file failure aborts the batch; the report says what
//! happened.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::DEFAULT_EXTENSIONS;
use crate::error::{Error, Result};
use crate::util::file_extension;
use crate::{DocTranslator, formats};

/// Options for a directory translation run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Extensions to process (lowercase, no dot)
    pub extensions: Vec<String>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl BatchOptions {
    fn matches(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }
}

/// Outcome counts for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Files translated and written
    pub translated: usize,
    /// Files whose output already existed
    pub skipped: usize,
    /// Files that could not be processed (unsupported, unreadable, ...)
    pub failed: usize,
}

impl BatchReport {
    pub const fn total(&self) -> usize {
        self.translated + self.skipped + self.failed
    }
}

/// Progress callback: (files finished, files total).
pub type ProgressFn = Box<dyn Fn(usize, usize) + Send>;

/// Translate every matching file under `source_dir` into `target_dir`.
///
/// Output paths are built from translated directory components and file
/// stems (extensions are preserved). A file whose output path already
/// exists is skipped without touching its adapter, which is what makes an
/// interrupted batch resumable.
///
/// Only a missing source directory is an error; everything below it that
/// cannot be read is logged and skipped.
pub async fn translate_directory(
    translator: &DocTranslator,
    source_dir: &Path,
    target_dir: &Path,
    options: &BatchOptions,
    progress: Option<ProgressFn>,
) -> Result<BatchReport> {
    if !source_dir.is_dir() {
        return Err(Error::DocumentRead {
            path: source_dir.display().to_string(),
            reason: "not a directory".to_string(),
        });
    }

    let files = collect_files(source_dir, options);
    info!(
        "Translating {} files from {} into {}",
        files.len(),
        source_dir.display(),
        target_dir.display()
    );

    let total = files.len();
    let mut report = BatchReport::default();

    for (done, file) in files.iter().enumerate() {
        process_file(translator, source_dir, target_dir, file, &mut report).await;
        if let Some(ref callback) = progress {
            callback(done + 1, total);
        }
    }

    // Autosaves cover long runs; this covers the tail entries
    if let Err(e) = translator.save_cache() {
        warn!("Failed to save translation cache: {e}");
    }

    info!(
        "Batch complete: {} translated, {} skipped, {} failed",
        report.translated, report.skipped, report.failed
    );
    Ok(report)
}

async fn process_file(
    translator: &DocTranslator,
    source_dir: &Path,
    target_dir: &Path,
    file: &Path,
    report: &mut BatchReport,
) {
    let Ok(rel) = file.strip_prefix(source_dir) else {
        // collect_files only yields children of source_dir
        error!("{} is outside the source directory", file.display());
        report.failed += 1;
        return;
    };

    let output = translated_output_path(translator, target_dir, rel).await;

    if output.exists() {
        info!(
            "Skipping {} - translated file already exists",
            file.display()
        );
        report.skipped += 1;
        return;
    }

    if let Some(parent) = output.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        error!("Cannot create {}: {e}", parent.display());
        report.failed += 1;
        return;
    }

    match translate_one(translator, file, &output).await {
        Ok(()) => {
            info!("Translated {} -> {}", file.display(), output.display());
            report.translated += 1;
        }
        Err(e) => {
            error!("Failed to translate {}: {e}", file.display());
            report.failed += 1;
        }
    }
}

async fn translate_one(translator: &DocTranslator, input: &Path, output: &Path) -> Result<()> {
    let extension = file_extension(input).unwrap_or_default();
    let adapter = formats::adapter_for(&extension)?;
    adapter.translate_file(translator, input, output).await
}

/// Mirror `rel` under `target_dir` with translated path components.
///
/// Directory names and the file stem go through the normal single-string
/// pipeline (detector, cache, provider); the extension is kept verbatim so
/// dispatch and resume detection keep working on the translated tree.
async fn translated_output_path(
    translator: &DocTranslator,
    target_dir: &Path,
    rel: &Path,
) -> PathBuf {
    let mut out = target_dir.to_path_buf();

    if let Some(parent) = rel.parent() {
        for component in parent.components() {
            let name = component.as_os_str().to_string_lossy();
            let translated = translator.translate_text(&name).await.into_text();
            out.push(sanitize_component(&translated, &name));
        }
    }

    let stem = rel
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let translated_stem = translator.translate_text(&stem).await.into_text();
    let mut file_name = sanitize_component(&translated_stem, &stem);
    if let Some(ext) = rel.extension() {
        file_name.push('.');
        file_name.push_str(&ext.to_string_lossy());
    }
    out.push(file_name);
    out
}

/// Keep translated path components usable as file names.
///
/// Providers occasionally emit separators or blank strings; those would
/// silently change the output tree shape.
fn sanitize_component(translated: &str, original: &str) -> String {
    let cleaned: String = translated
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let cleaned = cleaned.trim().to_string();
    if cleaned.is_empty() {
        original.to_string()
    } else {
        cleaned
    }
}

fn collect_files(source_dir: &Path, options: &BatchOptions) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk(source_dir, options.recursive, &mut files);
    files.retain(|f| file_extension(f).is_some_and(|e| options.matches(&e)));
    // Deterministic processing order, for logs and tests alike
    files.sort();
    files
}

/// Collect files under `dir`. An unreadable directory or entry is logged
/// and skipped so the rest of the batch still runs.
fn walk(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Skipping unreadable directory {}: {e}", dir.display());
            return;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };
        if path.is_dir() {
            if recursive {
                walk(&path, true, out);
            }
        } else {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_cover_the_usual_formats() {
        let options = BatchOptions::default();
        assert!(options.matches("xlsx"));
        assert!(options.matches("csv"));
        assert!(!options.matches("exe"));
    }

    #[test]
    fn test_sanitize_component_strips_separators() {
        assert_eq!(sanitize_component("a/b", "x"), "a b");
        assert_eq!(sanitize_component("  ", "x"), "x");
        assert_eq!(sanitize_component("report", "x"), "report");
    }

    #[test]
    fn test_walk_skips_unreadable_directories() {
        let mut out = Vec::new();
        walk(Path::new("/definitely/not/a/real/path"), true, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_report_total() {
        let report = BatchReport {
            translated: 2,
            skipped: 3,
            failed: 1,
        };
        assert_eq!(report.total(), 6);
    }
}
