use async_trait::async_trait;

use crate::error::ChatResult;
use crate::types::{ChatResponse, SessionId};

/// A conversational backend: open a session, send a message into it.
///
/// Implemented by [`crate::ChatClient`] for the hosted API and by offline
/// stand-ins (dry runs, tests).
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn create_session(&self) -> ChatResult<SessionId>;

    async fn send_message(&self, session: &SessionId, content: &str) -> ChatResult<ChatResponse>;

    fn backend_name(&self) -> &'static str;
}
