//! Broker connection parameters.
//!
//! The profiler does not interpret these; they are handed unchanged to the
//! connector that opens the broker client.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Paths to the message broker and object-store configuration files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrokerSettings {
    /// MQTT broker configuration file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mqtt_config_path: Option<PathBuf>,
    /// S3 side-channel configuration file for large payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_config_path: Option<PathBuf>,
}
