//! Doc Translator CLI - batch-translate a directory of documents.

use anyhow::{Context, Result};
use clap::Parser;
use doc_translator_core::{
    AppConfig, BatchOptions, DocTranslator, Lang, TranslatorConfig, batch, util,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "doc-translate")]
#[command(author, version, about = "Translate a directory of documents", long_about = None)]
struct Args {
    /// Source directory containing files to translate
    source_dir: PathBuf,

    /// Target directory for translated output (structure is mirrored)
    target_dir: PathBuf,

    /// Source language code
    #[arg(short = 's', long, default_value = "th")]
    source: String,

    /// Target language code
    #[arg(short = 't', long, default_value = "en")]
    target: String,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_API_BASE", default_value = "http://localhost:8080/v1")]
    api_base: String,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    api_key: Option<String>,

    /// Model name for OpenAI-compatible API
    #[arg(long, env = "OPENAI_MODEL", default_value = "default_model")]
    model: String,

    /// Translation cache file (default: translation-cache.json in the target directory)
    #[arg(long)]
    cache_file: Option<PathBuf>,

    /// Disable the persistent translation cache
    #[arg(long)]
    no_cache: bool,

    /// Only process the top-level directory
    #[arg(long)]
    no_recursive: bool,

    /// File extensions to process (comma-separated, no dots)
    #[arg(long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Minimum delay between provider calls in milliseconds
    #[arg(long)]
    min_interval_ms: Option<u64>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    // Override config with CLI arguments
    config.source_lang = Lang::new(&args.source);
    config.target_lang = Lang::new(&args.target);
    config.translator = TranslatorConfig::new(args.api_base, args.api_key, args.model);

    if let Some(interval) = args.min_interval_ms {
        config.min_request_interval_ms = interval;
    }

    if args.no_cache {
        config.cache.enabled = false;
    } else if config.cache.path.is_none() {
        config.cache.path = Some(
            args.cache_file
                .unwrap_or_else(|| util::default_cache_file(&args.target_dir)),
        );
    }

    if !args.source_dir.is_dir() {
        anyhow::bail!("Source directory not found: {}", args.source_dir.display());
    }

    let mut options = BatchOptions::default();
    options.recursive = !args.no_recursive;
    if let Some(extensions) = args.extensions {
        options.extensions = extensions.iter().map(|e| e.to_lowercase()).collect();
    }

    info!(
        "Translating {} -> {} ({} to {})",
        args.source_dir.display(),
        args.target_dir.display(),
        config.source_lang,
        config.target_lang
    );

    let translator =
        DocTranslator::new(config).context("Failed to initialize translator")?;

    // Setup progress bar
    let pb = ProgressBar::new(0);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let pb_update = pb.clone();
    let report = batch::translate_directory(
        &translator,
        &args.source_dir,
        &args.target_dir,
        &options,
        Some(Box::new(move |done, total| {
            #[allow(clippy::cast_possible_truncation)]
            pb_update.set_length(total as u64);
            pb_update.set_position(done as u64);
        })),
    )
    .await
    .context("Batch translation failed")?;

    pb.finish_with_message("Translation complete");

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!(
            "Done: {} translated, {} skipped, {} failed ({} cached translations)",
            report.translated,
            report.skipped,
            report.failed,
            translator.cache().len()
        );
    }

    Ok(())
}
