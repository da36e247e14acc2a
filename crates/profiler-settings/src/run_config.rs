//! Validated run configuration.

use profiler_core::errors::ConfigError;
use profiler_core::identity::Role;
use profiler_core::ids::{EdgeId, RunId};

use crate::types::{BrokerSettings, EventSettings, ProfilerSettings};

/// Everything the emitter needs, with identity already resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Run id.
    pub run_id: RunId,
    /// Role derived from rank.
    pub role: Role,
    /// Broker parameters passed to the connector.
    pub broker: BrokerSettings,
    /// Event delivery behaviour.
    pub events: EventSettings,
}

impl RunConfig {
    /// Coordinator configuration with default broker and event settings.
    pub fn coordinator(run_id: impl Into<RunId>, server_id: Option<EdgeId>) -> Self {
        Self {
            run_id: run_id.into(),
            role: Role::Coordinator { server_id },
            broker: BrokerSettings::default(),
            events: EventSettings::default(),
        }
    }

    /// Edge id this process reports under.
    pub fn edge_id(&self) -> EdgeId {
        self.role.edge_id()
    }
}

impl TryFrom<&ProfilerSettings> for RunConfig {
    type Error = ConfigError;

    fn try_from(settings: &ProfilerSettings) -> Result<Self, Self::Error> {
        let run_id = settings.run_id.clone().ok_or(ConfigError::MissingRunId)?;
        let role = Role::from_rank(
            settings.rank,
            settings.server_id,
            settings.client_id_list.as_ref(),
        )?;
        Ok(Self {
            run_id,
            role,
            broker: settings.broker.clone(),
            events: settings.events.clone(),
        })
    }
}

impl ProfilerSettings {
    /// Validate identity fields and build a [`RunConfig`].
    pub fn to_run_config(&self) -> Result<RunConfig, ConfigError> {
        RunConfig::try_from(self)
    }
}
