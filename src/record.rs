//! Minimal typed view over a corpus record.
//!
//! Only the fields the pipeline inspects are decoded; everything else in the
//! line is ignored here and survives untouched because the writer re-emits
//! the raw line rather than this view.

use serde::Deserialize;
use serde_json::Value;

/// Decoded subset of one JSONL record.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RecordView {
    /// Chat messages; only the first carries `info`.
    #[serde(default)]
    pub messages: Option<Vec<Message>>,
}

/// One chat message of a record.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Message {
    /// Message text; non-string content is ignored.
    #[serde(default)]
    pub content: Option<Value>,
    /// Provenance and grading metadata.
    #[serde(default)]
    pub info: Option<MessageInfo>,
}

/// Provenance and grading metadata carried by the first message.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MessageInfo {
    /// Expected answer; only its truthiness matters.
    #[serde(default)]
    pub reference_answer: Option<Value>,
    /// Present (non-null) only on code problems driven by test cases.
    #[serde(default)]
    pub test_case: Option<Value>,
    /// Raw provenance tag.
    #[serde(default)]
    pub source: Option<Value>,
}

impl RecordView {
    /// Decode a raw line; `None` for anything that is not a well-formed record.
    pub fn parse(line: &str) -> Option<Self> {
        serde_json::from_str(line).ok()
    }

    /// Messages in order, empty when the field is missing or null.
    pub fn messages(&self) -> &[Message] {
        self.messages.as_deref().unwrap_or_default()
    }

    /// Info mapping of the first message.
    pub fn info(&self) -> Option<&MessageInfo> {
        self.messages().first().and_then(|msg| msg.info.as_ref())
    }

    /// Raw provenance tag when it is a string.
    pub fn source_tag(&self) -> Option<&str> {
        self.info()
            .and_then(|info| info.source.as_ref())
            .and_then(Value::as_str)
    }

    /// Text content of every message that carries string content.
    pub fn contents(&self) -> impl Iterator<Item = &str> {
        self.messages()
            .iter()
            .filter_map(|msg| msg.content.as_ref().and_then(Value::as_str))
    }

    /// Trimmed content of the first message, if non-empty.
    pub fn first_content(&self) -> Option<&str> {
        self.messages()
            .first()
            .and_then(|msg| msg.content.as_ref())
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
