//! Wire format for chat messages and the render-side entry built from it.
//!
//! Every frame is a flat JSON object:
//!
//! ```json
//! {"type":"message","user":"alice","text":"hi","timestamp":1700000000}
//! ```
//!
//! Inbound frames are only required to be valid JSON. Whatever fields are
//! present get rendered; missing ones are left empty in the [`DisplayEntry`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// Message type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Message,
}

/// Chat message as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub r#type: MessageType,
    pub user: String,
    pub text: String,
    /// Unix timestamp in seconds, assigned by the sender
    pub timestamp: i64,
}

impl ChatMessage {
    /// Build a `message` envelope.
    pub fn new(user: impl Into<String>, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            r#type: MessageType::Message,
            user: user.into(),
            text: text.into(),
            timestamp,
        }
    }

    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A message as it is rendered into the message list.
///
/// Fields are optional because inbound frames are not schema-checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayEntry {
    pub user: Option<String>,
    pub text: Option<String>,
    pub timestamp: Option<i64>,
}

impl DisplayEntry {
    /// Build an entry from any JSON value, picking up whichever fields exist.
    pub fn from_value(value: &Value) -> Self {
        Self {
            user: field_as_text(value, "user"),
            text: field_as_text(value, "text"),
            timestamp: value.get("timestamp").and_then(|ts| {
                ts.as_i64()
                    .or_else(|| ts.as_f64().map(|secs| secs.trunc() as i64))
            }),
        }
    }
}

impl From<&ChatMessage> for DisplayEntry {
    fn from(message: &ChatMessage) -> Self {
        Self {
            user: Some(message.user.clone()),
            text: Some(message.text.clone()),
            timestamp: Some(message.timestamp),
        }
    }
}

/// Parse an inbound text frame.
///
/// Fails only when the payload is not JSON at all.
pub fn decode_frame(payload: &str) -> Result<DisplayEntry, DecodeError> {
    let value: Value = serde_json::from_str(payload)?;
    Ok(DisplayEntry::from_value(&value))
}

fn field_as_text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
