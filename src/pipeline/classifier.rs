use crate::utils::{Result, TranslatorClientError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Messages that mean the archive itself is unreadable. Checked before the
/// structural keywords; a message matching both counts as corrupted.
const CORRUPTION_KEYWORDS: &[&str] = &["corrupted", "invalid zip", "not a zip", "broken archive"];

/// Messages that mean the archive is readable but not a translatable mod.
const STRUCTURE_KEYWORDS: &[&str] = &[
    "no folder",
    "missing folder",
    "assets",
    "lang",
    "resource",
    "translation",
];

/// Terminal classification of one finished task. Each category maps to one
/// disposition and one statistics bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeCategory {
    Success,
    Skipped,
    Corrupted,
    InvalidStructure,
    ClientError,
    ServerError,
    ConnectionError,
    Timeout,
    RetryExceeded,
    ApplicationError,
}

impl OutcomeCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::Corrupted => "corrupted",
            Self::InvalidStructure => "invalid_structure",
            Self::ClientError => "client_error",
            Self::ServerError => "server_error",
            Self::ConnectionError => "connection_error",
            Self::Timeout => "timeout",
            Self::RetryExceeded => "retry_exceeded",
            Self::ApplicationError => "application_error",
        }
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn keyword_category(message: &str) -> Option<OutcomeCategory> {
    let lower = message.to_lowercase();
    if CORRUPTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(OutcomeCategory::Corrupted);
    }
    if STRUCTURE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(OutcomeCategory::InvalidStructure);
    }
    None
}

/// Assign a failed submission to an outcome category.
///
/// Server messages are keyword-matched first regardless of status class, so
/// a corruption report that arrives on a 5xx (or after retries ran out)
/// still routes the file to the corrupted directory instead of being
/// retried forever.
pub fn classify(error: &TranslatorClientError) -> OutcomeCategory {
    match error {
        TranslatorClientError::StatusError { status, message } => keyword_category(message)
            .unwrap_or(if status.is_server_error() {
                OutcomeCategory::ServerError
            } else {
                OutcomeCategory::ClientError
            }),
        TranslatorClientError::RetryExhausted { message, .. } => {
            keyword_category(message).unwrap_or(OutcomeCategory::RetryExceeded)
        }
        TranslatorClientError::HttpError(e) if e.is_timeout() => OutcomeCategory::Timeout,
        TranslatorClientError::HttpError(e) if e.is_connect() => OutcomeCategory::ConnectionError,
        _ => OutcomeCategory::ApplicationError,
    }
}

/// Classify a failure and apply its disposition: corrupted and invalid
/// archives move to their directories, everything else stays in place so a
/// later run can retry it.
pub fn handle_failure(
    error: &TranslatorClientError,
    path: &Path,
    invalid_dir: &Path,
    corrupted_dir: &Path,
) -> OutcomeCategory {
    let category = classify(error);
    let name = file_name(path);

    match category {
        OutcomeCategory::Corrupted => {
            error!(file = %name, error = %error, "Archive is corrupted");
            if let Err(e) = move_file(path, corrupted_dir) {
                warn!(file = %name, error = %e, "Failed to move corrupted archive");
            }
        }
        OutcomeCategory::InvalidStructure => {
            error!(file = %name, error = %error, "Archive has invalid mod structure");
            if let Err(e) = move_file(path, invalid_dir) {
                warn!(file = %name, error = %e, "Failed to move invalid archive");
            }
        }
        OutcomeCategory::ConnectionError
        | OutcomeCategory::Timeout
        | OutcomeCategory::RetryExceeded
        | OutcomeCategory::ServerError => {
            warn!(
                file = %name,
                category = %category,
                error = %error,
                "Transient failure, file left in place for a future run"
            );
        }
        OutcomeCategory::ApplicationError => {
            error!(file = %name, error = ?error, "Unexpected failure");
        }
        _ => {
            error!(file = %name, category = %category, error = %error, "Submission failed");
        }
    }

    category
}

/// Move `source` into `target_dir`, creating the directory and replacing any
/// previous file of the same name. Falls back to copy-and-remove when a
/// rename crosses filesystems.
pub fn move_file(source: &Path, target_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(target_dir)?;
    let target = target_dir.join(source.file_name().unwrap_or(source.as_os_str()));

    if target.exists() {
        fs::remove_file(&target)?;
    }

    if fs::rename(source, &target).is_err() {
        fs::copy(source, &target)?;
        fs::remove_file(source)?;
    }

    info!(from = %source.display(), to = %target.display(), "Moved file");
    Ok(target)
}

/// First free path for `file_name` inside `dir`, suffixing `(n)` before the
/// extension on collision.
pub fn unique_target_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (file_name, None),
    };

    let mut n = 1usize;
    loop {
        let name = match ext {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
