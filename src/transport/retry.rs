use reqwest::StatusCode;
use std::time::Duration;

/// Retry behavior for the upload method, fixed at session construction.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub backoff_factor: f64,
    pub transient_statuses: Vec<StatusCode>,
}

impl RetryPolicy {
    pub fn is_transient(&self, status: StatusCode) -> bool {
        self.transient_statuses.contains(&status)
    }

    /// Delay before the retry following `attempt` (1-based):
    /// `factor * 2^(attempt-1)` seconds.
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as u32;
        let secs = self.backoff_factor * f64::from(2u32.pow(exponent));
        Duration::from_secs_f64(secs.max(0.0))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_factor: 0.5,
            transient_statuses: vec![
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }
}
