//! In-memory broker client for tests and dry runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use profiler_core::errors::TransportError;
use profiler_settings::BrokerSettings;

use crate::publisher::{BrokerConnector, Publisher};

/// A message recorded by [`MemoryBroker`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Topic the message was published on.
    pub topic: String,
    /// Raw JSON payload.
    pub payload: String,
}

impl PublishedMessage {
    /// Parse the payload as JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }
}

/// In-memory publisher that records every message, for deterministic tests
/// without a broker.
#[derive(Default)]
pub struct MemoryBroker {
    published: Mutex<Vec<PublishedMessage>>,
    fail_publish: AtomicBool,
}

impl MemoryBroker {
    /// Empty broker that accepts every publish.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far, in publish order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().clone()
    }

    /// Make subsequent publishes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.fail_publish.store(failing, Ordering::Relaxed);
    }
}

impl Publisher for MemoryBroker {
    fn publish(&self, topic: &str, payload_json: &str) -> Result<(), TransportError> {
        if self.fail_publish.load(Ordering::Relaxed) {
            return Err(TransportError::Publish {
                topic: topic.to_owned(),
                reason: "memory broker configured to fail".into(),
            });
        }
        self.published.lock().push(PublishedMessage {
            topic: topic.to_owned(),
            payload: payload_json.to_owned(),
        });
        Ok(())
    }
}

/// Connector handing out one shared [`MemoryBroker`] and counting how many
/// connections were opened.
pub struct MemoryConnector {
    broker: Arc<MemoryBroker>,
    connect_count: AtomicUsize,
    connect_delay: Option<Duration>,
    refuse: bool,
    last_run_topic: Mutex<Option<String>>,
}

impl MemoryConnector {
    /// Connector that succeeds immediately.
    pub fn new() -> Self {
        Self {
            broker: Arc::new(MemoryBroker::new()),
            connect_count: AtomicUsize::new(0),
            connect_delay: None,
            refuse: false,
            last_run_topic: Mutex::new(None),
        }
    }

    /// Sleep for `delay` inside every `connect`, widening construction races.
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Fail every `connect` with [`TransportError::Connect`].
    pub fn refusing(mut self) -> Self {
        self.refuse = true;
        self
    }

    /// The broker every connection publishes into.
    pub fn broker(&self) -> &Arc<MemoryBroker> {
        &self.broker
    }

    /// Number of `connect` calls so far.
    pub fn connect_count(&self) -> usize {
        self.connect_count.load(Ordering::SeqCst)
    }

    /// Run topic passed to the most recent `connect`.
    pub fn last_run_topic(&self) -> Option<String> {
        self.last_run_topic.lock().clone()
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerConnector for MemoryConnector {
    fn connect(
        &self,
        _broker: &BrokerSettings,
        run_topic: &str,
    ) -> Result<Arc<dyn Publisher>, TransportError> {
        let _ = self.connect_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.connect_delay {
            std::thread::sleep(delay);
        }
        if self.refuse {
            return Err(TransportError::Connect("memory connector refused".into()));
        }
        *self.last_run_topic.lock() = Some(run_topic.to_owned());
        Ok(Arc::clone(&self.broker) as Arc<dyn Publisher>)
    }
}
