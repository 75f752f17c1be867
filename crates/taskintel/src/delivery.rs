//! Delayed delivery of the final report to the caller's callback URL.
//!
//! Delivery failures are retried a small bounded number of times with
//! exponential backoff, then abandoned and logged. Never retried
//! indefinitely.

use serde_json::json;
use std::time::Duration;
use taskintel_core::config::DeliveryConfig;
use taskintel_core::error::{IntelError, Result};
use tracing::{debug, error, info, warn};

/// Callback POST client with the bounded retry policy.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    http: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl DeliveryClient {
    pub fn new(config: &DeliveryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| IntelError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// POST the report to the callback URL as an in-channel message.
    pub async fn deliver(&self, response_url: &str, text: &str) -> Result<()> {
        let mut attempt = 0u32;
        let mut delay = self.retry_delay;

        loop {
            match self.post_once(response_url, text).await {
                Ok(()) => {
                    if attempt > 0 {
                        info!(attempt, "Delivery succeeded after retry");
                    }
                    return Ok(());
                }
                Err(e) if attempt < self.max_retries && e.is_retryable() => {
                    warn!(
                        attempt = attempt + 1,
                        max = self.max_retries,
                        error = %e,
                        "Delivery failed; backing off"
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.mul_f32(2.0);
                    attempt += 1;
                }
                Err(e) => {
                    error!(error = %e, "Delivery abandoned");
                    return Err(e);
                }
            }
        }
    }

    async fn post_once(&self, response_url: &str, text: &str) -> Result<()> {
        let body = json!({ "response_type": "in_channel", "text": text });
        debug!(url = %response_url, "Posting delayed response");

        let response = self
            .http
            .post(response_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    IntelError::timeout(e.to_string())
                } else {
                    IntelError::delivery(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.is_server_error() {
            Err(IntelError::delivery(format!("Callback returned HTTP {status}")))
        } else {
            // 4xx means the callback URL is bad or expired; retrying is
            // pointless.
            Err(IntelError::invalid_response(format!(
                "Callback rejected delivery: HTTP {status}"
            )))
        }
    }
}
