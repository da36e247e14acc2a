//! Broker client contract.
//!
//! The broker transport (connection management, retries, auth, object-store
//! offload) lives outside this crate. The emitter only needs a way to open a
//! client for a run and a synchronous publish call on it.

use std::sync::Arc;

use profiler_core::errors::TransportError;
use profiler_settings::BrokerSettings;

/// A connected broker client.
///
/// Shared by every thread that emits events, so implementations must accept
/// concurrent `publish` calls. Ordering across concurrent callers is up to
/// the transport.
pub trait Publisher: Send + Sync {
    /// Publish a JSON payload on `topic`. Blocks for as long as the
    /// transport does.
    fn publish(&self, topic: &str, payload_json: &str) -> Result<(), TransportError>;
}

/// Opens a [`Publisher`] for a run.
pub trait BrokerConnector: Send + Sync {
    /// Connect using `broker` parameters, bound to the run topic `run_topic`.
    fn connect(
        &self,
        broker: &BrokerSettings,
        run_topic: &str,
    ) -> Result<Arc<dyn Publisher>, TransportError>;
}

impl<F> BrokerConnector for F
where
    F: Fn(&BrokerSettings, &str) -> Result<Arc<dyn Publisher>, TransportError> + Send + Sync,
{
    fn connect(
        &self,
        broker: &BrokerSettings,
        run_topic: &str,
    ) -> Result<Arc<dyn Publisher>, TransportError> {
        self(broker, run_topic)
    }
}
