//! Event types and the wire payload.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{EdgeId, RunId};

/// Lifecycle phase an event reports.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A named operation began.
    Started,
    /// A named operation finished.
    Ended,
}

impl EventType {
    /// Lowercase name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamp of an event, tagged by phase.
///
/// Flattened into [`EventMessage`] so exactly one of `started_time` or
/// `ended_time` appears on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    /// Seconds since epoch at which the operation started.
    #[serde(rename = "started_time")]
    Started(i64),
    /// Seconds since epoch at which the operation ended.
    #[serde(rename = "ended_time")]
    Ended(i64),
}

impl EventTime {
    /// Build the timestamp for the given phase.
    pub const fn new(event_type: EventType, timestamp: i64) -> Self {
        match event_type {
            EventType::Started => Self::Started(timestamp),
            EventType::Ended => Self::Ended(timestamp),
        }
    }

    /// Phase this timestamp belongs to.
    pub const fn event_type(self) -> EventType {
        match self {
            Self::Started(_) => EventType::Started,
            Self::Ended(_) => EventType::Ended,
        }
    }

    /// Seconds since epoch.
    pub const fn timestamp(self) -> i64 {
        match self {
            Self::Started(ts) | Self::Ended(ts) => ts,
        }
    }
}

/// Payload published to the events topic.
///
/// ```json
/// {"run_id":"r1","edge_id":7,"event_name":"init","event_value":"","started_time":1700000000}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMessage {
    /// Run the event belongs to.
    pub run_id: RunId,
    /// Participant that emitted the event.
    pub edge_id: EdgeId,
    /// Caller-chosen label.
    pub event_name: String,
    /// Caller-supplied value, empty when none was given.
    pub event_value: String,
    /// Phase timestamp.
    #[serde(flatten)]
    pub time: EventTime,
}

impl EventMessage {
    /// Phase this message reports.
    pub const fn event_type(&self) -> EventType {
        self.time.event_type()
    }

    /// JSON encoding of the payload.
    ///
    /// Separators are compact (`,` and `:`). Earlier producers of this topic
    /// wrote `", "` and `": "`, so the bytes differ while the decoded object
    /// is the same; consumers parse the payload rather than compare it.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
