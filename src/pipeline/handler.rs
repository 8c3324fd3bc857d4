use crate::pipeline::{classifier, validate::validate_archive, BatchProcessor, OutcomeCategory};
use crate::utils::{Result, SubmissionParams, TranslatorClientError};
use std::path::Path;
use tracing::{info, warn};

/// Terminal result of one task, as reported to the event sink.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub category: OutcomeCategory,
    pub message: Option<String>,
}

impl FileOutcome {
    fn success() -> Self {
        Self {
            category: OutcomeCategory::Success,
            message: None,
        }
    }

    fn new(category: OutcomeCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: Some(message.into()),
        }
    }
}

impl BatchProcessor {
    /// Run one archive through validate → submit → classify-or-save →
    /// cleanup. Exactly one category is recorded per call.
    pub async fn process_single_file(
        &self,
        path: &Path,
        params: &SubmissionParams,
    ) -> FileOutcome {
        let name = display_name(path);

        let (ok, reason) = validate_archive(path);
        if !ok {
            warn!(file = %name, reason = %reason, "Skipping archive");
            self.stats().record(OutcomeCategory::Skipped);
            return FileOutcome::new(OutcomeCategory::Skipped, reason);
        }

        info!(file = %name, "Submitting archive");

        match self.submit_and_save(path, &name, params).await {
            Ok(()) => {
                self.stats().record_success(params.provider.as_str());
                FileOutcome::success()
            }
            Err(err) => {
                let category = classifier::handle_failure(
                    &err,
                    path,
                    self.invalid_dir(),
                    self.corrupted_dir(),
                );
                self.stats().record(category);
                FileOutcome::new(category, err.to_string())
            }
        }
    }

    async fn submit_and_save(
        &self,
        path: &Path,
        name: &str,
        params: &SubmissionParams,
    ) -> Result<()> {
        let body = self.session().upload(name, path, params).await?;

        if body.len() < self.config().min_response_size {
            return Err(TranslatorClientError::ImplausibleResponse { len: body.len() });
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| name.to_string());
        let output_path = self.output_dir().join(format!("{stem}.jar"));

        tokio::fs::create_dir_all(self.output_dir()).await?;
        tokio::fs::write(&output_path, &body).await?;

        // Re-stat the written file; a partial write must not count as success.
        let written = tokio::fs::metadata(&output_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written < self.config().min_response_size as u64 {
            let _ = tokio::fs::remove_file(&output_path).await;
            return Err(TranslatorClientError::OutputVerification {
                path: output_path.display().to_string(),
                len: written,
            });
        }

        info!(file = %name, output = %output_path.display(), "Saved translated archive");

        match tokio::fs::remove_file(path).await {
            Ok(()) => info!(file = %name, "Deleted original archive"),
            Err(e) => {
                // Never lose track of the original: park it under the output
                // directory instead.
                warn!(file = %name, error = %e, "Could not delete original, moving to backups");
                let backup_dir = self.output_dir().join("original_backups");
                if let Err(e) = move_to_backup(path, &backup_dir, name) {
                    warn!(file = %name, error = %e, "Backup move failed, original left in place");
                }
            }
        }

        Ok(())
    }
}

fn move_to_backup(source: &Path, backup_dir: &Path, name: &str) -> Result<()> {
    std::fs::create_dir_all(backup_dir)?;
    let target = classifier::unique_target_path(backup_dir, name);
    if std::fs::rename(source, &target).is_err() {
        std::fs::copy(source, &target)?;
        std::fs::remove_file(source)?;
    }
    info!(from = %source.display(), to = %target.display(), "Moved original to backups");
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
