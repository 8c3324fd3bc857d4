use crate::transport::RetryPolicy;
use crate::utils::{Result, SubmissionParams, TranslatorClientError};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use url::Url;

const ARCHIVE_MIME: &str = "application/java-archive";
const FILE_FIELD: &str = "jarFile";

/// Outcome of the pre-flight health probe. A missing endpoint is not proof
/// the service is down, so it reports as unverified rather than unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Available,
    Unverified(String),
    Unavailable { status: StatusCode },
}

/// Reusable connection to the translation endpoint. Retries the upload POST
/// on the policy's transient statuses; every other failure surfaces after a
/// single attempt.
pub struct TransportSession {
    client: Client,
    base_url: Url,
    policy: RetryPolicy,
}

impl TransportSession {
    pub fn new(base_url: Url, policy: RetryPolicy, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            policy,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST one archive as a multipart form and return the translated bytes.
    /// The archive is re-opened and streamed from disk on every attempt so
    /// the whole file is never buffered in memory.
    pub async fn upload(
        &self,
        file_name: &str,
        path: &Path,
        params: &SubmissionParams,
    ) -> Result<Bytes> {
        let mut attempt = 0usize;

        loop {
            attempt += 1;

            let file = tokio::fs::File::open(path).await?;
            let len = file.metadata().await?.len();
            let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), len)
                .file_name(file_name.to_string())
                .mime_str(ARCHIVE_MIME)?;
            let mut form = Form::new().part(FILE_FIELD, part);
            for (name, value) in params.to_form_fields() {
                form = form.text(name, value);
            }

            let response = self
                .client
                .post(self.base_url.clone())
                .multipart(form)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                return Ok(response.bytes().await?);
            }

            let message = extract_error_message(response).await;

            if self.policy.is_transient(status) {
                if attempt >= self.policy.max_attempts {
                    return Err(TranslatorClientError::RetryExhausted {
                        attempts: attempt,
                        status,
                        message,
                    });
                }
                let delay = self.policy.backoff_delay(attempt);
                warn!(
                    file = %file_name,
                    status = %status,
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Transient status, retrying upload"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            return Err(TranslatorClientError::StatusError { status, message });
        }
    }

    /// Probe the derived health endpoint once before a batch.
    pub async fn health_check(&self) -> HealthStatus {
        let url = self.health_url();
        debug!(url = %url, "Probing service health");

        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    HealthStatus::Available
                } else if status == StatusCode::NOT_FOUND {
                    HealthStatus::Unverified("health endpoint not found".to_string())
                } else {
                    HealthStatus::Unavailable { status }
                }
            }
            Err(e) => HealthStatus::Unverified(e.to_string()),
        }
    }

    /// Replace a trailing `/process` segment with `/health`, or append
    /// `/health` when the base URL has no such segment.
    fn health_url(&self) -> Url {
        let mut url = self.base_url.clone();
        let path = url.path().trim_end_matches('/');
        let base = path.strip_suffix("/process").unwrap_or(path);
        url.set_path(&format!("{base}/health"));
        url
    }
}

/// Pull a human-readable message out of a failed response: a JSON body's
/// `error` or `message` field, then raw text, then the status line.
async fn extract_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();

    if let Ok(body) = serde_json::from_slice::<Value>(&bytes) {
        let field = body
            .get("error")
            .and_then(Value::as_str)
            .or_else(|| body.get("message").and_then(Value::as_str));
        if let Some(message) = field {
            return message.to_string();
        }
    }

    let text = String::from_utf8_lossy(&bytes).trim().to_string();
    if text.is_empty() {
        format!("request failed with status {status}")
    } else {
        text
    }
}
