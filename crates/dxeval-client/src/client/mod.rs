//! Chat client for the hosted bot API.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::backend::ChatBackend;
use crate::error::{ChatError, ChatResult};
use crate::types::{
    ChatResponse, ClientConfig, CreateSessionRequest, OutgoingMessage, SendMessageRequest,
    SessionId,
};

mod http;

use http::HttpBackend;

const USER_AGENT_VALUE: &str = concat!("dxeval-client/", env!("CARGO_PKG_VERSION"));

/// Chat client bound to one bot.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: HttpBackend,
    bot_id: String,
}

impl ChatClient {
    /// Build a client. Fails with [`ChatError::Config`] when credentials are missing.
    pub fn new(config: ClientConfig) -> ChatResult<Self> {
        let credentials = config.credentials()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ChatError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        let base_url = config.url.trim_end_matches('/').to_string();

        Ok(Self {
            http: HttpBackend {
                client,
                base_url,
                api_key: credentials.api_key,
                config,
            },
            bot_id: credentials.bot_id,
        })
    }

    pub fn from_env() -> ChatResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.http.base_url
    }

    fn session_url(&self) -> String {
        format!("{}/api/v1/chat/session", self.http.base_url)
    }

    fn message_url(&self, session: &SessionId) -> String {
        format!(
            "{}/api/v1/chat/session/{}/message",
            self.http.base_url, session
        )
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn create_session(&self) -> ChatResult<SessionId> {
        let url = self.session_url();
        debug!(url = %url, bot_id = %self.bot_id, "creating chat session");

        let body = CreateSessionRequest {
            bot_id: &self.bot_id,
            user: self.http.config.user.as_deref(),
            initial_messages: None,
        };
        let value = self.http.post_json(&url, &body).await?;

        parse_session_id(&value)
    }

    async fn send_message(&self, session: &SessionId, content: &str) -> ChatResult<ChatResponse> {
        let url = self.message_url(session);
        debug!(url = %url, chars = content.len(), "sending message");

        let body = SendMessageRequest {
            message: OutgoingMessage {
                content,
                kind: "USER",
            },
        };
        let value = self.http.post_json(&url, &body).await?;

        Ok(ChatResponse::from_raw(value))
    }

    fn backend_name(&self) -> &'static str {
        "chat-api"
    }
}

fn parse_session_id(value: &Value) -> ChatResult<SessionId> {
    match value.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(SessionId(id.clone())),
        Some(Value::Number(n)) => Ok(SessionId(n.to_string())),
        _ => Err(ChatError::InvalidResponse {
            message: "session response missing 'id'".into(),
        }),
    }
}
