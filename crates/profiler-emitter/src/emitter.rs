//! The profiler event emitter.
//!
//! Owns the run identity and the broker client. Every call builds one
//! message through the codec, logs it, and hands it to the publisher
//! synchronously. Publish failures are returned to the caller untouched.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use profiler_core::codec::build_event_message;
use profiler_core::errors::TransportError;
use profiler_core::event::EventType;
use profiler_core::ids::{EdgeId, RunId};
use profiler_settings::RunConfig;

use crate::publisher::{BrokerConnector, Publisher};

/// Emits `started` / `ended` lifecycle events for one run.
///
/// All fields are fixed at construction, so a shared reference can be used
/// from any number of threads without locking.
pub struct ProfilerEventEmitter {
    run_id: RunId,
    edge_id: EdgeId,
    duplicate_ended_publish: bool,
    publisher: Arc<dyn Publisher>,
}

impl ProfilerEventEmitter {
    /// Resolve identity from `config` and open a broker client bound to the run.
    pub fn connect(
        config: &RunConfig,
        connector: &dyn BrokerConnector,
    ) -> Result<Self, TransportError> {
        let run_topic = config.run_id.to_string();
        let publisher = connector.connect(&config.broker, &run_topic)?;
        let emitter = Self::with_publisher(config, publisher);
        info!(
            run_id = %emitter.run_id,
            edge_id = %emitter.edge_id,
            coordinator = config.role.is_coordinator(),
            "profiler event emitter ready"
        );
        Ok(emitter)
    }

    /// Build an emitter around an already connected publisher.
    pub fn with_publisher(config: &RunConfig, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            run_id: config.run_id.clone(),
            edge_id: config.edge_id(),
            duplicate_ended_publish: config.events.duplicate_ended_publish,
            publisher,
        }
    }

    /// Run this emitter reports for.
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Edge id used when a call does not override it.
    pub fn edge_id(&self) -> EdgeId {
        self.edge_id
    }

    /// Whether `ended` events are published twice.
    pub fn duplicates_ended_publish(&self) -> bool {
        self.duplicate_ended_publish
    }

    /// Report that `event_name` started.
    ///
    /// `event_value` defaults to an empty string and `edge_override`
    /// replaces this process's edge id for this one event.
    pub fn log_event_started(
        &self,
        event_name: &str,
        event_value: Option<&str>,
        edge_override: Option<EdgeId>,
    ) -> Result<(), TransportError> {
        self.emit(EventType::Started, event_name, event_value, edge_override)
    }

    /// Report that `event_name` ended.
    ///
    /// Published twice in a row unless duplicate ended publishing is turned
    /// off in the event settings.
    pub fn log_event_ended(
        &self,
        event_name: &str,
        event_value: Option<&str>,
        edge_override: Option<EdgeId>,
    ) -> Result<(), TransportError> {
        self.emit(EventType::Ended, event_name, event_value, edge_override)
    }

    fn emit(
        &self,
        event_type: EventType,
        event_name: &str,
        event_value: Option<&str>,
        edge_override: Option<EdgeId>,
    ) -> Result<(), TransportError> {
        let edge_id = edge_override.unwrap_or(self.edge_id);
        let (topic, message) =
            build_event_message(&self.run_id, edge_id, event_type, event_name, event_value);
        let payload = message.to_json()?;

        info!(
            event_type = event_type.as_str(),
            event_name,
            edge_id = %edge_id,
            payload = %payload,
            "event {event_type}"
        );

        let deliveries = match event_type {
            EventType::Ended if self.duplicate_ended_publish => 2,
            _ => 1,
        };
        for _ in 0..deliveries {
            self.publisher.publish(topic, &payload)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProfilerEventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfilerEventEmitter")
            .field("run_id", &self.run_id)
            .field("edge_id", &self.edge_id)
            .field("duplicate_ended_publish", &self.duplicate_ended_publish)
            .finish_non_exhaustive()
    }
}
