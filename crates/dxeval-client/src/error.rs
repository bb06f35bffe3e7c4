//! Error types for the chat client.

use std::time::Duration;

/// Chat API errors.
///
/// Every failed attempt maps to exactly one variant; the retry loop only
/// looks at [`ChatError::is_retryable`].
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Rate limit exceeded (HTTP 429).
    #[error("rate limited: retry after {retry_after:?}")]
    RateLimited {
        retry_after: Option<Duration>,
        body: String,
    },

    /// Server-side failure (HTTP 5xx).
    #[error("server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    /// Any other non-success status. Never retried.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport error: timeout, refused connection, truncated body.
    #[error("network error: {message}")]
    Network { message: String },

    /// Response arrived but did not have the expected shape.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Configuration error (missing credentials, bad client settings).
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl ChatError {
    /// Whether the error is transient and the request may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Server { .. } | Self::Network { .. }
        )
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::Server { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body carried by the error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::RateLimited { body, .. }
            | Self::Server { body, .. }
            | Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Map a non-success HTTP status and its body to an error.
    pub(crate) fn from_status(status: u16, body: String, retry_after: Option<Duration>) -> Self {
        match status {
            429 => Self::RateLimited { retry_after, body },
            500..=599 => Self::Server { status, body },
            _ => Self::Status { status, body },
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;
