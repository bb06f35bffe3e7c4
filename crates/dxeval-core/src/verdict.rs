//! Judge verdicts embedded in free-text responses.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^```(?:json)?\s*|\s*```$").expect("valid fence regex"));

/// Pull the first JSON object out of `raw`, tolerating code fences and prose
/// around it. Returns `None` unless the result parses to an object.
pub fn extract_embedded_json(raw: &str) -> Option<Map<String, Value>> {
    let stripped = FENCE.replace_all(raw.trim(), "");
    let mut text = stripped.trim();

    if !(text.starts_with('{') && text.ends_with('}')) {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        if end < start {
            return None;
        }
        text = &text[start..=end];
    }

    match serde_json::from_str(text).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Normalized value of one verdict field. `None` means invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Yes,
    No,
    Unscorable,
}

impl CheckOutcome {
    fn parse(value: &str, allow_unscorable: bool) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "YES" => Some(Self::Yes),
            "NO" => Some(Self::No),
            "UNSCORABLE" if allow_unscorable => Some(Self::Unscorable),
            _ => None,
        }
    }
}

/// The three checks of one judged case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verdict {
    pub top1: Option<CheckOutcome>,
    pub top3: Option<CheckOutcome>,
    pub top5: Option<CheckOutcome>,
}

impl Verdict {
    /// Verdict from judge response text. Missing or unparseable payloads are
    /// invalid at every level.
    pub fn from_text(text: Option<&str>) -> Self {
        match text.and_then(extract_embedded_json) {
            Some(payload) => Self::from_payload(&payload),
            None => Self::default(),
        }
    }

    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        Self {
            top1: field(payload, "TOP1").and_then(|v| CheckOutcome::parse(v, true)),
            top3: field(payload, "TOP3").and_then(|v| CheckOutcome::parse(v, false)),
            top5: field(payload, "TOP5").and_then(|v| CheckOutcome::parse(v, false)),
        }
    }
}

/// String value of `key`, matched case-insensitively.
fn field<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    payload
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .and_then(|(_, v)| v.as_str())
}
