/// AI Client: the single point of entry for calls to the AI normalization endpoint.
///
/// No other module talks to the endpoint directly; `normalization` builds the
/// request and interprets the record, this module owns transport and retries.
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("AI endpoint returned an empty body")]
    EmptyContent,

    #[error("AI request timed out after {0:?}")]
    Timeout(Duration),

    #[error("AI normalization is not configured")]
    Disabled,
}

/// Body posted to the endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRequest<'a, D: Serialize> {
    pub instruction: &'a str,
    pub data: &'a D,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<&'a str>,
}

/// Wraps the endpoint with retry logic and fence-tolerant JSON decoding.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl AiClient {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self, AiError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            endpoint,
            api_key,
        })
    }

    /// Posts the request and returns the raw response body.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call<D: Serialize>(&self, request: &AiRequest<'_, D>) -> Result<String, AiError> {
        let mut last_error: Option<AiError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "AI call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut builder = self
                .client
                .post(&self.endpoint)
                .header("content-type", "application/json")
                .json(request);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key);
            }

            let response = match builder.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(AiError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("AI endpoint returned {}: {}", status, body);
                last_error = Some(AiError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(AiError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            debug!("AI call succeeded: {} bytes", body.len());
            return Ok(body);
        }

        Err(last_error.unwrap_or(AiError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the endpoint and deserializes the body as JSON.
    pub async fn call_json<D: Serialize, T: DeserializeOwned>(
        &self,
        request: &AiRequest<'_, D>,
    ) -> Result<T, AiError> {
        let body = self.call(request).await?;
        let text = strip_json_fences(&body);
        if text.is_empty() {
            return Err(AiError::EmptyContent);
        }
        serde_json::from_str(text).map_err(AiError::Parse)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(stripped)
}
