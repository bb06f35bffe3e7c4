//! Normalization of the chat API's reply shapes.
//!
//! The hosted API has answered with several layouts over time. They are
//! resolved once here so callers only ever see a [`ChatReply`].

use serde_json::Value;

/// One role-tagged message from a `messages`/`data` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: Option<String>,
}

impl ChatMessage {
    fn from_value(value: &Value) -> Self {
        let role = match value.get("role") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let content = match value.get("content") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Object(inner)) => inner
                .get("content")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string()),
            _ => None,
        };
        Self { role, content }
    }

    fn is_assistant(&self) -> bool {
        let role = self.role.to_ascii_uppercase();
        role == "ASSISTANT" || role == "AI"
    }
}

/// Known reply layouts.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    /// `{"messages": [{"role": "ASSISTANT", "content": ...}, ...]}` (or `data`).
    Messages(Vec<ChatMessage>),
    /// `{"answer": {"content": ...}}`
    Answer(String),
    /// `{"content": ...}`
    Content(String),
    /// Anything else, kept verbatim.
    Raw(Value),
}

impl ChatReply {
    /// Resolve a raw payload into a reply shape.
    ///
    /// Priority: a message list with at least one usable assistant entry,
    /// then `answer.content`, then top-level `content`, then `Raw`.
    pub fn from_value(value: &Value) -> Self {
        let list = value
            .get("messages")
            .filter(|v| is_truthy(v))
            .or_else(|| value.get("data"))
            .and_then(Value::as_array);

        if let Some(list) = list {
            let messages: Vec<ChatMessage> = list.iter().map(ChatMessage::from_value).collect();
            if messages
                .iter()
                .any(|m| m.is_assistant() && m.content.is_some())
            {
                return Self::Messages(messages);
            }
        }

        if let Some(text) = value.pointer("/answer/content").and_then(Value::as_str) {
            return Self::Answer(text.trim().to_string());
        }

        if let Some(text) = value.get("content").and_then(Value::as_str) {
            return Self::Content(text.trim().to_string());
        }

        Self::Raw(value.clone())
    }

    /// Assistant text, when the reply had a recognizable shape.
    pub fn assistant_text(&self) -> Option<&str> {
        match self {
            Self::Messages(messages) => messages
                .iter()
                .rev()
                .find(|m| m.is_assistant() && m.content.is_some())
                .and_then(|m| m.content.as_deref()),
            Self::Answer(text) | Self::Content(text) => Some(text),
            Self::Raw(_) => None,
        }
    }

    /// Plain text for storage; unrecognized payloads render as JSON.
    pub fn text(&self) -> String {
        match self.assistant_text() {
            Some(text) => text.to_string(),
            None => match self {
                Self::Raw(value) => value.to_string(),
                _ => String::new(),
            },
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        _ => true,
    }
}
