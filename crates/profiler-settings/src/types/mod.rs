//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the launcher's
//! JSON format. Each section implements [`Default`]; `#[serde(default)]`
//! allows partial JSON with missing fields taking their default value.

mod broker;

pub use broker::*;

use profiler_core::identity::ClientIdList;
use profiler_core::ids::{EdgeId, RunId};
use profiler_core::logging::LogFormat;
use serde::{Deserialize, Serialize};

/// Root settings type for a profiler process.
///
/// ```json
/// {
///   "runId": "r1",
///   "rank": 2,
///   "clientIdList": "[9,10]",
///   "broker": { "mqttConfigPath": "/etc/mlops/mqtt.yaml" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfilerSettings {
    /// Run this process belongs to. Required to build a [`crate::RunConfig`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    /// Process rank; 0 is the coordinator.
    pub rank: i64,
    /// Coordinator edge id (rank 0 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<EdgeId>,
    /// Client ids assigned by the coordinator (required for rank != 0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id_list: Option<ClientIdList>,
    /// Broker and object-store connection parameters.
    pub broker: BrokerSettings,
    /// Event delivery behaviour.
    pub events: EventSettings,
    /// Local diagnostic logging.
    pub logging: LoggingSettings,
}

/// Event delivery behaviour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventSettings {
    /// Publish every `ended` event twice in a row.
    ///
    /// Existing monitoring consumers receive each `ended` event twice; turning
    /// this off sends it once.
    pub duplicate_ended_publish: bool,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            duplicate_ended_publish: true,
        }
    }
}

/// Local diagnostic logging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive (`RUST_LOG` wins when set).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}
