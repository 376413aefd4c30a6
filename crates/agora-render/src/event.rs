//! Deliberation events
//!
//! Events arrive from an external stream as JSON. They are immutable once
//! received and owned by the rendering surface for one render pass.

use crate::error::FeedResult;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A typed notification from the deliberation process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Type tag; an open set of known and unknown values
    pub event_type: String,
    /// Opaque payload
    #[serde(default)]
    pub data: Map<String, Value>,
    /// ISO-8601 timestamp as sent upstream
    #[serde(default)]
    pub timestamp: String,
    /// Owning session, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl Event {
    /// Create event with empty payload and timestamp
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            data: Map::new(),
            timestamp: String::new(),
            session_id: None,
        }
    }

    /// With a payload object; non-object values are stored under `value`
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        self
    }

    /// With timestamp
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// With session id
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Decode one event from JSON text
    ///
    /// # Errors
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Decode one line of an event log
    ///
    /// # Errors
    /// - `FeedError::InvalidEvent` for malformed JSON or a missing `event_type`
    pub fn parse_line(line: &str) -> FeedResult<Self> {
        Ok(Self::from_json(line.trim())?)
    }

    /// Timestamp parsed as RFC 3339, `None` when absent or malformed
    #[must_use]
    pub fn parsed_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.timestamp.trim()).ok()
    }

    /// True when the payload has no fields
    #[inline]
    #[must_use]
    pub fn is_empty_data(&self) -> bool {
        self.data.is_empty()
    }

    /// String payload field
    #[must_use]
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    /// Unsigned integer payload field; accepts numeric strings
    #[must_use]
    pub fn u64_field(&self, field: &str) -> Option<u64> {
        match self.data.get(field)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
