//! # TurboDocx Webhook Schemas
//!
//! The delivery body is a small envelope: an event tag plus an opaque `data`
//! object whose shape depends on the event. `data` stays a loosely typed JSON
//! map since TurboDocx may add events or fields at any time.

use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::consts;

/// Event type tag, e.g. `signature.document.completed`.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum EventType {
    #[display("{}", consts::EVENT_DOCUMENT_COMPLETED)]
    DocumentCompleted,
    #[display("{}", consts::EVENT_DOCUMENT_VOIDED)]
    DocumentVoided,
    #[display("{_0}")]
    Unknown(String),
}

impl EventType {
    /// Bounded label for metrics: every unknown tag collapses into `unknown`.
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::DocumentCompleted => consts::EVENT_DOCUMENT_COMPLETED,
            Self::DocumentVoided => consts::EVENT_DOCUMENT_VOIDED,
            Self::Unknown(_) => "unknown",
        }
    }
}

impl From<&str> for EventType {
    fn from(tag: &str) -> Self {
        match tag {
            consts::EVENT_DOCUMENT_COMPLETED => Self::DocumentCompleted,
            consts::EVENT_DOCUMENT_VOIDED => Self::DocumentVoided,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Root webhook payload from TurboDocx
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventEnvelope {
    /// Dot-namespaced event type tag
    pub event: String,
    /// Event specific data, empty when missing or not an object
    #[serde(default, deserialize_with = "object_or_empty")]
    pub data: Map<String, Value>,
    /// Signing time echoed by TurboDocx, informational only
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(data) => Ok(data),
        _ => Ok(Map::new()),
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(ts) => Ok(Some(ts)),
        _ => Ok(None),
    }
}

impl EventEnvelope {
    pub fn new(event: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            event: event.into(),
            data,
            timestamp: None,
        }
    }

    /// Parses the raw delivery body.
    ///
    /// Fails when the body is not JSON (`is_syntax`) or not an object with a
    /// string `event` (`is_data`).
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    pub fn event_type(&self) -> EventType {
        EventType::from(self.event.as_str())
    }

    /// Reads a string field from `data`, `None` when absent or not a string.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}
