//! HTTP layer: status mapping and retry.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ChatError, ChatResult};
use crate::types::ClientConfig;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// HTTP backend for making requests (holds reqwest client, token, config).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) config: ClientConfig,
}

impl HttpBackend {
    /// POST a JSON body and decode a JSON reply, retrying transient failures.
    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> ChatResult<Value> {
        let mut retries = 0;
        let max_retries = self.config.max_retries;

        loop {
            match self.post_json_once(url, body).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && retries < max_retries => {
                    let backoff = match &e {
                        ChatError::RateLimited {
                            retry_after: Some(retry_after),
                            ..
                        } => (*retry_after).min(MAX_BACKOFF),
                        _ => backoff_delay(self.config.backoff_base_ms, retries),
                    };
                    retries += 1;

                    warn!(
                        error = %e,
                        retry = retries,
                        max_retries = max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying request"
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_json_once<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> ChatResult<Value> {
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let text = response.text().await.map_err(|e| ChatError::Network {
                message: format!("failed to read response body: {}", e),
            })?;
            return serde_json::from_str(&text).map_err(|e| ChatError::InvalidResponse {
                message: format!("response is not JSON: {}", e),
            });
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();

        Err(ChatError::from_status(status.as_u16(), body, retry_after))
    }
}

/// Exponential backoff: `base * 2^attempt`, capped at 30 seconds.
pub(crate) fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor)).min(MAX_BACKOFF)
}
