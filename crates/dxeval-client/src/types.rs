//! Configuration and wire types for the chat API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, ChatResult};
use crate::reply::ChatReply;

/// Chat client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL for the chat API.
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Bearer token.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Target bot identifier.
    #[serde(default)]
    pub bot_id: Option<String>,

    /// Caller identity sent on session creation.
    #[serde(default)]
    pub user: Option<String>,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Read (whole request) timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Maximum retries for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds, doubled on every retry.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

fn default_api_url() -> String {
    "https://api.metisai.ir".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_base_ms() -> u64 {
    500
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            api_key: None,
            bot_id: None,
            user: None,
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `DXEVAL_API_URL` | Chat API base URL |
    /// | `DXEVAL_API_KEY` | Bearer token |
    /// | `DXEVAL_BOT_ID` | Target bot id |
    /// | `DXEVAL_CONNECT_TIMEOUT` | Connect timeout (seconds) |
    /// | `DXEVAL_READ_TIMEOUT` | Read timeout (seconds) |
    /// | `DXEVAL_MAX_RETRIES` | Max retries for transient failures |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DXEVAL_API_URL").unwrap_or_else(|_| default_api_url()),
            api_key: std::env::var("DXEVAL_API_KEY").ok(),
            bot_id: std::env::var("DXEVAL_BOT_ID").ok(),
            user: None,
            connect_timeout_secs: std::env::var("DXEVAL_CONNECT_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_connect_timeout),
            read_timeout_secs: std::env::var("DXEVAL_READ_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_read_timeout),
            max_retries: std::env::var("DXEVAL_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_retries),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set API key and bot id.
    pub fn with_credentials(mut self, api_key: impl Into<String>, bot_id: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self.bot_id = Some(bot_id.into());
        self
    }

    /// Set the retry cap.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base backoff delay.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base_ms = base.as_millis() as u64;
        self
    }

    /// Resolve credentials, failing when either value is missing or blank.
    pub fn credentials(&self) -> ChatResult<Credentials> {
        let api_key = non_blank(self.api_key.as_deref());
        let bot_id = non_blank(self.bot_id.as_deref());
        match (api_key, bot_id) {
            (Some(api_key), Some(bot_id)) => Ok(Credentials {
                api_key: api_key.to_string(),
                bot_id: bot_id.to_string(),
            }),
            (None, None) => Err(ChatError::Config {
                message: "missing API key and bot id (DXEVAL_API_KEY, DXEVAL_BOT_ID)".into(),
            }),
            (None, _) => Err(ChatError::Config {
                message: "missing API key (DXEVAL_API_KEY)".into(),
            }),
            (_, None) => Err(ChatError::Config {
                message: "missing bot id (DXEVAL_BOT_ID)".into(),
            }),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolved API credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub bot_id: String,
}

/// Opaque handle for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /api/v1/chat/session`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateSessionRequest<'a> {
    pub bot_id: &'a str,
    pub user: Option<&'a str>,
    pub initial_messages: Option<()>,
}

/// Body of `POST /api/v1/chat/session/{id}/message`.
#[derive(Debug, Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub message: OutgoingMessage<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OutgoingMessage<'a> {
    pub content: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// A reply from `send_message`: the normalized shape plus the raw payload.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub reply: ChatReply,
    pub raw: serde_json::Value,
}

impl ChatResponse {
    pub fn from_raw(raw: serde_json::Value) -> Self {
        Self {
            reply: ChatReply::from_value(&raw),
            raw,
        }
    }

    /// Plain-text rendering of the reply.
    pub fn text(&self) -> String {
        self.reply.text()
    }
}
