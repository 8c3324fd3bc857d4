pub mod discovery;
pub mod pipeline;
pub mod transport;
pub mod utils;

pub use discovery::find_archive_files;
pub use pipeline::{
    BatchProcessor, EventSink, FileOutcome, OutcomeCategory, OutputDirs, PipelineEvent,
    StatsAggregator, Statistics,
};
pub use transport::{HealthStatus, RetryPolicy, TransportSession};
pub use utils::{ClientConfig, Result, SubmissionParams, TranslatorClientError};
