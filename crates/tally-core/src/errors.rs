//! Error types for the judgment call path.
//!
//! The retry controller branches on `ProviderError::is_transient()` only;
//! this module is the single place where failures are classified.

use std::time::Duration;

/// Failures from one judgment request.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Request exceeded the client timeout.
    #[error("request timed out")]
    Timeout,

    /// Rate limit exceeded (HTTP 429).
    #[error("rate limited: retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Upstream or gateway failure (HTTP 5xx).
    #[error("server error: {message}")]
    Server {
        status: Option<u16>,
        message: String,
    },

    /// Transport failure or unexpected API response outside the 5xx range.
    #[error("network error: {message}")]
    Network { message: String },

    /// Authentication failed, usually a missing or invalid API key.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Response content violated the JSON contract.
    #[error("protocol error: {message}")]
    Protocol { message: String },
}

impl ProviderError {
    /// Whether a retry with backoff can reasonably change the outcome.
    ///
    /// Timeouts, rate limits and 5xx are properties of the remote side and
    /// wait-and-retry applies. Everything else (auth, malformed content,
    /// connection-level failures) reproduces under identical input.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::RateLimited { .. } | Self::Server { .. }
        )
    }

    /// Classify a free-form error message. Last resort only: the transport
    /// and status-code paths carry typed information and never come through
    /// here.
    pub fn classify_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let msg = message.to_lowercase();

        if msg.contains("rate limit") || msg.contains("429") {
            Self::RateLimited { retry_after: None }
        } else if msg.contains("timeout") || msg.contains("timed out") {
            Self::Timeout
        } else if msg.contains("500")
            || msg.contains("502")
            || msg.contains("503")
            || msg.contains("504")
            || msg.contains("server error")
            || msg.contains("bad gateway")
        {
            Self::Server {
                status: None,
                message,
            }
        } else if msg.contains("unauthorized") || msg.contains("401") || msg.contains("api key") {
            Self::Unauthorized { message }
        } else {
            Self::Network { message }
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Network {
                message: err.to_string(),
            }
        } else {
            Self::classify_message(err.to_string())
        }
    }
}

/// Result type for judgment requests.
pub type ProviderResult<T> = Result<T, ProviderError>;
