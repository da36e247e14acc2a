//! Line-oriented publisher.
//!
//! Writes each message as `topic<TAB>payload` followed by a newline. Used by
//! the CLI as a dry-run transport and for piping events into another tool.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use profiler_core::errors::TransportError;
use profiler_settings::BrokerSettings;

use crate::publisher::{BrokerConnector, Publisher};

/// Publisher writing one line per message to `W`.
pub struct LinePublisher<W> {
    writer: Mutex<W>,
}

impl<W: Write> LinePublisher<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Publisher for LinePublisher<W> {
    fn publish(&self, topic: &str, payload_json: &str) -> Result<(), TransportError> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{topic}\t{payload_json}")
            .and_then(|()| writer.flush())
            .map_err(|e| TransportError::Publish {
                topic: topic.to_owned(),
                reason: e.to_string(),
            })
    }
}

/// Connector producing a [`LinePublisher`] on stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutConnector;

impl BrokerConnector for StdoutConnector {
    fn connect(
        &self,
        broker: &BrokerSettings,
        run_topic: &str,
    ) -> Result<Arc<dyn Publisher>, TransportError> {
        debug!(
            run_topic,
            mqtt_config = ?broker.mqtt_config_path,
            s3_config = ?broker.s3_config_path,
            "writing events to stdout instead of a broker"
        );
        Ok(Arc::new(LinePublisher::new(io::stdout())))
    }
}
