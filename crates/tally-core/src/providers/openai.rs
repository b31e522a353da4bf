//! OpenAI-compatible chat-completions client.
//!
//! The only module that interprets HTTP status codes. Everything downstream
//! branches on [`ProviderError`] variants, never on status numbers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde_json::json;
use tracing::debug;

use super::LlmClient;
use crate::config::AuditConfig;
use crate::errors::{ProviderError, ProviderResult};

const USER_AGENT_VALUE: &str = concat!("tally/", env!("CARGO_PKG_VERSION"));

/// Client for one configured endpoint/model pair.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    /// Build the client. Timeout and user agent are fixed at construction;
    /// a missing API key is not an error here and surfaces as
    /// [`ProviderError::Unauthorized`] on the first call.
    pub fn new(config: &AuditConfig) -> ProviderResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ProviderError::Network {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> ProviderResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        // Zero temperature: verdicts must be reproducible across re-runs.
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": 0.0,
        });

        debug!(url = %url, model = %self.model, "sending judgment request");

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {key}"));
        }

        let response = request.send().await?;
        let status = response.status();

        match status.as_u16() {
            200..=299 => {}

            401 | 403 => {
                let message = response.text().await.unwrap_or_else(|_| status.to_string());
                return Err(ProviderError::Unauthorized { message });
            }

            429 => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs);
                return Err(ProviderError::RateLimited { retry_after });
            }

            500..=599 => {
                let message = response.text().await.unwrap_or_else(|_| status.to_string());
                return Err(ProviderError::Server {
                    status: Some(status.as_u16()),
                    message,
                });
            }

            _ => {
                let message = response.text().await.unwrap_or_else(|_| status.to_string());
                return Err(ProviderError::Network {
                    message: format!("HTTP {}: {}", status.as_u16(), message),
                });
            }
        }

        let body = response.text().await.map_err(ProviderError::from)?;
        let payload: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ProviderError::Protocol {
                message: format!("response body is not JSON: {e}"),
            })?;

        payload
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Protocol {
                message: "response missing /choices/0/message/content".to_string(),
            })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
