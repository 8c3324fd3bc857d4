use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mod_translator_client::utils::{parse_language, AiProvider, TranslationMethod, DEFAULT_THREADS};
use mod_translator_client::{
    find_archive_files, BatchProcessor, ClientConfig, EventSink, OutputDirs, PipelineEvent,
    RetryPolicy, SubmissionParams, TransportSession,
};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

#[derive(Parser)]
#[command(name = "mod-translator-client")]
#[command(about = "Batch client that uploads mod archives to a remote translation API")]
struct Cli {
    /// Use the backup translator when the primary fails (yes/no)
    #[arg(long = "fb", default_value = "yes", value_parser = parse_yes_no)]
    backup_fallback: bool,

    /// Maximum translation attempts per key on the server side
    #[arg(long = "cl", default_value_t = 3)]
    retry_ceiling: u32,

    /// Primary translation method
    #[arg(long = "m", value_enum, default_value_t = TranslationMethod::Bing)]
    method: TranslationMethod,

    /// Source language code
    #[arg(long = "f", default_value = "en", value_parser = parse_language)]
    source_lang: String,

    /// Target language code
    #[arg(long = "t", default_value = "ru", value_parser = parse_language)]
    target_lang: String,

    /// AI provider used by the server
    #[arg(long = "ai-provider", value_enum, default_value_t = AiProvider::Openrouter)]
    ai_provider: AiProvider,

    /// Directory scanned for .jar archives
    #[arg(long, default_value = ".")]
    input_dir: PathBuf,

    /// Directory for translated archives
    #[arg(long, default_value = "1")]
    output_dir: PathBuf,

    /// Directory for archives with invalid mod structure
    #[arg(long, default_value = "2")]
    output_invalid: PathBuf,

    /// Directory for corrupted archives
    #[arg(long, default_value = "3")]
    output_corrupted: PathBuf,

    /// Number of concurrent uploads
    #[arg(long, default_value_t = DEFAULT_THREADS)]
    threads: usize,

    /// Scan the input directory recursively
    #[arg(long)]
    recursive: bool,

    /// Skip archives whose translated output already exists
    #[arg(long)]
    skip_existing: bool,

    /// List candidates without uploading or touching the filesystem
    #[arg(long)]
    dry_run: bool,

    /// Skip the pre-flight health probe
    #[arg(long)]
    skip_health_check: bool,

    /// Log file path
    #[arg(long, default_value = "translator.log")]
    log_file: PathBuf,

    /// Enable debug-level logging
    #[arg(long)]
    verbose: bool,

    /// Translation API endpoint
    #[arg(long, env = "TRANSLATOR_SERVER_URL", default_value = "http://localhost:8250/process")]
    server_url: Url,
}

fn parse_yes_no(input: &str) -> Result<bool, String> {
    match input {
        "yes" => Ok(true),
        "no" => Ok(false),
        other => Err(format!("expected 'yes' or 'no', got '{other}'")),
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mod_translator_client={default_level}")));

    let file_layer = if let Some(parent) = cli.log_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create log directory {}", parent.display()))?;
        }
        // Append so earlier runs stay in the log.
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&cli.log_file)
            .with_context(|| format!("cannot open log file {}", cli.log_file.display()))?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

/// Render pipeline events as a progress bar until the sender side closes.
async fn render_progress(mut rx: mpsc::UnboundedReceiver<PipelineEvent>) {
    let bar = ProgressBar::hidden();
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );

    while let Some(event) = rx.recv().await {
        match event {
            PipelineEvent::BatchStarted { total } => {
                bar.set_length(total as u64);
                bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            }
            PipelineEvent::FileStarted { name } => bar.set_message(name),
            PipelineEvent::FileFinished { name, category, .. } => {
                bar.inc(1);
                bar.set_message(format!("{name}: {category}"));
            }
            PipelineEvent::BatchFinished { .. } => bar.finish_with_message("done"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    tracing::info!(
        input_dir = %cli.input_dir.display(),
        server_url = %cli.server_url,
        provider = cli.ai_provider.as_str(),
        threads = cli.threads,
        recursive = cli.recursive,
        "Starting mod translator client"
    );

    if !cli.input_dir.exists() {
        anyhow::bail!("input directory does not exist: {}", cli.input_dir.display());
    }

    let mut archives = find_archive_files(&cli.input_dir, cli.recursive)
        .with_context(|| format!("failed to scan {}", cli.input_dir.display()))?;
    tracing::info!(count = archives.len(), "Found archives");

    if cli.skip_existing {
        let before = archives.len();
        archives.retain(|path| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let existing = cli.output_dir.join(format!("{stem}.jar"));
            if existing.exists() {
                tracing::info!(file = %path.display(), "Skipping already translated archive");
                false
            } else {
                true
            }
        });
        tracing::info!(skipped = before - archives.len(), "Existing outputs skipped");
    }

    if archives.is_empty() {
        tracing::warn!("No archives to process");
        return Ok(());
    }

    let params = SubmissionParams {
        backup_fallback: cli.backup_fallback,
        retry_ceiling: cli.retry_ceiling,
        method: cli.method,
        source_lang: cli.source_lang.clone(),
        target_lang: cli.target_lang.clone(),
        provider: cli.ai_provider,
    };

    let config = ClientConfig {
        concurrency: cli.threads,
        ..ClientConfig::default()
    };
    let session = TransportSession::new(
        cli.server_url.clone(),
        RetryPolicy::default(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let dirs = OutputDirs {
        output: cli.output_dir.clone(),
        invalid: cli.output_invalid.clone(),
        corrupted: cli.output_corrupted.clone(),
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(render_progress(rx));

    let processor = BatchProcessor::new(session, dirs, config)
        .with_events(EventSink::new(tx))
        .with_dry_run(cli.dry_run)
        .with_skip_health_check(cli.skip_health_check);

    // Ctrl-C sets the cooperative stop flag; in-flight uploads finish.
    let stop = processor.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after in-flight tasks");
            stop.store(true, Ordering::Relaxed);
        }
    });

    let started = Instant::now();
    let stats = processor.process_files(archives, &params).await?;
    let elapsed = started.elapsed();

    drop(processor);
    let _ = renderer.await;

    if !cli.dry_run {
        println!("{}", stats.render());
        tracing::info!(
            elapsed_secs = format!("{:.2}", elapsed.as_secs_f64()),
            "Processing finished"
        );
    }

    Ok(())
}
