//! Bounded retry with backoff around the inference call.
//!
//! The remote model is slow to warm up and rate limited, so a single
//! attempt is rarely enough. [`fetch_with_retry`] shares one attempt
//! budget across "model loading" responses and network-level failures;
//! semantic API errors fail immediately.

use std::time::Duration;

use crate::client::{FetchError, GenerationParams, SvdClient};

/// Tunable parameters for the retry/backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, shared across loading and network causes.
    pub max_attempts: u32,
    /// Default wait before a retry when the API does not suggest one.
    pub initial_delay: Duration,
    /// Factor by which the default wait grows after each retry.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(20),
            multiplier: 1.5,
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
pub fn next_delay(current: Duration, config: &RetryConfig) -> Duration {
    Duration::from_millis((current.as_millis() as f64 * config.multiplier) as u64)
}

/// Fetch a finished video, retrying transient failures with backoff.
///
/// A 503 "model loading" response sleeps for the API's `estimated_time`
/// when present, otherwise for the current default delay; network-level
/// errors always use the default delay. Both consume the shared attempt
/// budget and scale the default delay. Semantic errors ([`FetchError::Api`],
/// [`FetchError::Truncated`]) return immediately, and the last error
/// propagates once the budget is exhausted.
pub async fn fetch_with_retry(
    client: &SvdClient,
    image: &[u8],
    params: &GenerationParams,
    config: &RetryConfig,
) -> Result<Vec<u8>, FetchError> {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match client.generate(image, params).await {
            Ok(bytes) => {
                tracing::debug!(attempt, len = bytes.len(), "Inference attempt succeeded");
                return Ok(bytes);
            }
            Err(err) => {
                if !err.is_retryable() || attempt >= config.max_attempts {
                    return Err(err);
                }

                let wait = match &err {
                    FetchError::ModelLoading {
                        estimated: Some(estimated),
                    } => *estimated,
                    _ => delay,
                };

                tracing::warn!(
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    error = %err,
                    "Inference attempt failed, retrying",
                );
                tokio::time::sleep(wait).await;
                delay = next_delay(delay, config);
            }
        }
    }
}
