//! Offline backend returning a canned reply.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dxeval_client::{ChatBackend, ChatResponse, ChatResult, SessionId};
use serde_json::json;

/// Canned diagnosis list for the generate stage.
pub const DRY_RUN_DIAGNOSIS: &str = r#"{"BEST":"Example Dx","RANKED":[["Example Dx",0.62],["Alt Dx 1",0.23],["Alt Dx 2",0.15],["Alt Dx 3",0.07],["Alt Dx 4",0.03]]}"#;

/// Canned verdict for the judge stage.
pub const DRY_RUN_VERDICT: &str =
    r#"{"TOP1":"YES","TOP3":"YES","TOP5":"YES","BEST":"Example Dx"}"#;

/// Backend that never touches the network.
#[derive(Debug)]
pub struct DryRunBackend {
    reply: String,
    sessions: AtomicU64,
}

impl DryRunBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            sessions: AtomicU64::new(0),
        }
    }

    pub fn diagnosis() -> Self {
        Self::new(DRY_RUN_DIAGNOSIS)
    }

    pub fn verdict() -> Self {
        Self::new(DRY_RUN_VERDICT)
    }
}

#[async_trait]
impl ChatBackend for DryRunBackend {
    async fn create_session(&self) -> ChatResult<SessionId> {
        let n = self.sessions.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(SessionId(format!("dry-run-{}", n)))
    }

    async fn send_message(&self, _session: &SessionId, _content: &str) -> ChatResult<ChatResponse> {
        Ok(ChatResponse::from_raw(json!({
            "content": self.reply,
            "dry_run": true,
        })))
    }

    fn backend_name(&self) -> &'static str {
        "dry-run"
    }
}
