use crate::pipeline::OutcomeCategory;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Mutex;

/// Aggregate counters for one batch, one bucket per outcome category plus a
/// provider-usage breakdown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub success: u64,
    pub skipped: u64,
    pub corrupted: u64,
    pub invalid_structure: u64,
    pub client_error: u64,
    pub server_error: u64,
    pub connection_error: u64,
    pub timeout: u64,
    pub retry_exceeded: u64,
    pub application_error: u64,
    pub provider_usage: HashMap<String, u64>,
}

impl Statistics {
    fn bucket_mut(&mut self, category: OutcomeCategory) -> &mut u64 {
        match category {
            OutcomeCategory::Success => &mut self.success,
            OutcomeCategory::Skipped => &mut self.skipped,
            OutcomeCategory::Corrupted => &mut self.corrupted,
            OutcomeCategory::InvalidStructure => &mut self.invalid_structure,
            OutcomeCategory::ClientError => &mut self.client_error,
            OutcomeCategory::ServerError => &mut self.server_error,
            OutcomeCategory::ConnectionError => &mut self.connection_error,
            OutcomeCategory::Timeout => &mut self.timeout,
            OutcomeCategory::RetryExceeded => &mut self.retry_exceeded,
            OutcomeCategory::ApplicationError => &mut self.application_error,
        }
    }

    pub fn count(&self, category: OutcomeCategory) -> u64 {
        match category {
            OutcomeCategory::Success => self.success,
            OutcomeCategory::Skipped => self.skipped,
            OutcomeCategory::Corrupted => self.corrupted,
            OutcomeCategory::InvalidStructure => self.invalid_structure,
            OutcomeCategory::ClientError => self.client_error,
            OutcomeCategory::ServerError => self.server_error,
            OutcomeCategory::ConnectionError => self.connection_error,
            OutcomeCategory::Timeout => self.timeout,
            OutcomeCategory::RetryExceeded => self.retry_exceeded,
            OutcomeCategory::ApplicationError => self.application_error,
        }
    }

    pub fn total(&self) -> u64 {
        self.success
            + self.skipped
            + self.corrupted
            + self.invalid_structure
            + self.client_error
            + self.server_error
            + self.connection_error
            + self.timeout
            + self.retry_exceeded
            + self.application_error
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.success as f64 / total as f64 * 100.0
        }
    }

    /// Tabulated final report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(50));
        let _ = writeln!(out, "PROCESSING STATISTICS");
        let _ = writeln!(out, "{}", "=".repeat(50));
        let _ = writeln!(out, "Translated:        {}", self.success);
        let _ = writeln!(out, "Skipped:           {}", self.skipped);
        let _ = writeln!(out, "Corrupted:         {}", self.corrupted);
        let _ = writeln!(out, "Invalid structure: {}", self.invalid_structure);
        let _ = writeln!(out, "Client errors:     {}", self.client_error);
        let _ = writeln!(out, "Server errors:     {}", self.server_error);
        let _ = writeln!(out, "Connection errors: {}", self.connection_error);
        let _ = writeln!(out, "Timeouts:          {}", self.timeout);
        let _ = writeln!(out, "Retries exceeded:  {}", self.retry_exceeded);
        let _ = writeln!(out, "Other failures:    {}", self.application_error);
        let _ = writeln!(out, "Total:             {}", self.total());
        let _ = writeln!(out, "Success rate:      {:.1}%", self.success_rate());
        if !self.provider_usage.is_empty() {
            let mut providers: Vec<_> = self.provider_usage.iter().collect();
            providers.sort();
            for (provider, count) in providers {
                let _ = writeln!(out, "Provider {provider}: {count}");
            }
        }
        let _ = write!(out, "{}", "=".repeat(50));
        out
    }
}

/// Shared counter set. Every increment takes the one mutex covering all
/// fields; readers snapshot after the workers have joined.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    inner: Mutex<Statistics>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, category: OutcomeCategory) {
        let mut stats = self.inner.lock().expect("stats mutex poisoned");
        *stats.bucket_mut(category) += 1;
    }

    pub fn record_success(&self, provider: &str) {
        let mut stats = self.inner.lock().expect("stats mutex poisoned");
        stats.success += 1;
        *stats.provider_usage.entry(provider.to_string()).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> Statistics {
        self.inner.lock().expect("stats mutex poisoned").clone()
    }
}
