pub mod config;
pub mod errors;

pub use config::{
    parse_language, AiProvider, ClientConfig, SubmissionParams, TranslationMethod,
    DEFAULT_THREADS, MAX_FILE_SIZE, MIN_RESPONSE_SIZE, REQUEST_TIMEOUT_SECS,
    SUPPORTED_LANGUAGES,
};
pub use errors::{Result, TranslatorClientError};
