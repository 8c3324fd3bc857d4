pub mod classifier;
pub mod events;
pub mod handler;
pub mod stats;
pub mod validate;

pub use classifier::OutcomeCategory;
pub use events::{EventSink, PipelineEvent};
pub use handler::FileOutcome;
pub use stats::{StatsAggregator, Statistics};
pub use validate::validate_archive;

use crate::transport::{HealthStatus, TransportSession};
use crate::utils::{ClientConfig, Result, SubmissionParams, TranslatorClientError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Destination directories for the three terminal file dispositions.
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub output: PathBuf,
    pub invalid: PathBuf,
    pub corrupted: PathBuf,
}

/// Owns the worker pool: submits every task, isolates per-task failures,
/// and reports aggregated statistics once all workers have joined.
#[derive(Clone)]
pub struct BatchProcessor {
    session: Arc<TransportSession>,
    dirs: Arc<OutputDirs>,
    config: ClientConfig,
    stats: Arc<StatsAggregator>,
    events: EventSink,
    stop: Arc<AtomicBool>,
    dry_run: bool,
    skip_health_check: bool,
}

impl BatchProcessor {
    pub fn new(session: TransportSession, dirs: OutputDirs, config: ClientConfig) -> Self {
        Self {
            session: Arc::new(session),
            dirs: Arc::new(dirs),
            config,
            stats: Arc::new(StatsAggregator::new()),
            events: EventSink::disabled(),
            stop: Arc::new(AtomicBool::new(false)),
            dry_run: false,
            skip_health_check: false,
        }
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_skip_health_check(mut self, skip: bool) -> Self {
        self.skip_health_check = skip;
        self
    }

    /// Cooperative stop flag; checked before each task starts, in-flight
    /// uploads run to completion.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    pub(crate) fn session(&self) -> &TransportSession {
        &self.session
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn output_dir(&self) -> &Path {
        &self.dirs.output
    }

    pub(crate) fn invalid_dir(&self) -> &Path {
        &self.dirs.invalid
    }

    pub(crate) fn corrupted_dir(&self) -> &Path {
        &self.dirs.corrupted
    }

    /// Process every task with bounded parallelism, then report. Only
    /// pre-flight unavailability aborts; per-file failures are recorded and
    /// never propagate.
    pub async fn process_files(
        &self,
        files: Vec<PathBuf>,
        params: &SubmissionParams,
    ) -> Result<Statistics> {
        if files.is_empty() {
            warn!("No archives to process");
            return Ok(self.stats.snapshot());
        }

        if self.dry_run {
            info!("Dry run, real processing disabled");
            for path in &files {
                info!(file = %path.display(), "Would process archive");
            }
            return Ok(self.stats.snapshot());
        }

        if self.skip_health_check {
            info!("Health check skipped");
        } else {
            match self.session.health_check().await {
                HealthStatus::Available => info!("Translation service is available"),
                HealthStatus::Unverified(reason) => {
                    warn!(reason = %reason, "Service health unverified, proceeding anyway");
                }
                HealthStatus::Unavailable { status } => {
                    error!(status = %status, "Translation service unavailable, aborting batch");
                    return Err(TranslatorClientError::ServerUnavailable { status });
                }
            }
        }

        let concurrency = self.config.concurrency.max(1);
        info!(
            count = files.len(),
            concurrency = concurrency,
            "Starting batch processing"
        );
        self.events.emit(PipelineEvent::BatchStarted {
            total: files.len(),
        });

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut handles = Vec::with_capacity(files.len());

        for path in files {
            let worker = self.clone();
            let params = params.clone();
            let permit = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                let _permit = permit.acquire_owned().await.expect("semaphore closed");

                if worker.stop.load(Ordering::Relaxed) {
                    warn!(file = %path.display(), "Stop requested, task not started");
                    return;
                }

                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                worker.events.emit(PipelineEvent::FileStarted { name: name.clone() });

                let outcome = worker.process_single_file(&path, &params).await;

                worker.events.emit(PipelineEvent::FileFinished {
                    name,
                    category: outcome.category,
                    message: outcome.message,
                });
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                // A panicked worker loses its slot but must not take the
                // batch down with it.
                error!(error = %e, "Worker task failed");
            }
        }

        let stats = self.stats.snapshot();
        info!(
            total = stats.total(),
            success = stats.success,
            "Batch processing finished\n{}",
            stats.render()
        );
        self.events.emit(PipelineEvent::BatchFinished {
            stats: stats.clone(),
        });

        Ok(stats)
    }
}
