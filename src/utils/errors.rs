use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslatorClientError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    StatusError { status: StatusCode, message: String },

    #[error("retries exhausted after {attempts} attempts, last status {status}: {message}")]
    RetryExhausted {
        attempts: usize,
        status: StatusCode,
        message: String,
    },

    #[error("server unavailable: health check returned {status}")]
    ServerUnavailable { status: StatusCode },

    #[error("response body too small ({len} bytes), service returned a corrupt result")]
    ImplausibleResponse { len: usize },

    #[error("written output {path} failed verification ({len} bytes)")]
    OutputVerification { path: String, len: u64 },
}

pub type Result<T> = std::result::Result<T, TranslatorClientError>;
