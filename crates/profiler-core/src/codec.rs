//! Builds the `(topic, payload)` pair for a profiler event.
//!
//! Pure functions only: the topic is fixed and the payload is a function of
//! its inputs plus a timestamp. [`build_event_message`] reads the wall clock;
//! [`build_event_message_at`] takes the timestamp explicitly.

use chrono::Utc;

use crate::event::{EventMessage, EventTime, EventType};
use crate::ids::{EdgeId, RunId};

/// Topic every profiler event is published under, for every run and edge.
pub const EVENT_TOPIC: &str = "/mlops/events";

/// Build the topic and payload for an event, stamped with the current time.
pub fn build_event_message(
    run_id: &RunId,
    edge_id: EdgeId,
    event_type: EventType,
    event_name: &str,
    event_value: Option<&str>,
) -> (&'static str, EventMessage) {
    build_event_message_at(
        run_id,
        edge_id,
        event_type,
        event_name,
        event_value,
        Utc::now().timestamp(),
    )
}

/// Build the topic and payload for an event with a caller-supplied timestamp
/// (seconds since epoch).
pub fn build_event_message_at(
    run_id: &RunId,
    edge_id: EdgeId,
    event_type: EventType,
    event_name: &str,
    event_value: Option<&str>,
    timestamp: i64,
) -> (&'static str, EventMessage) {
    let message = EventMessage {
        run_id: run_id.clone(),
        edge_id,
        event_name: event_name.to_owned(),
        event_value: event_value.unwrap_or_default().to_owned(),
        time: EventTime::new(event_type, timestamp),
    };
    (EVENT_TOPIC, message)
}
