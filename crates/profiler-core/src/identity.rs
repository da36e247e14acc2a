//! Edge identity resolution.
//!
//! Rank 0 is the coordinator: its edge id comes from configuration
//! (`server_id`) and falls back to `0`. Every other rank is a participant
//! whose edge id is the first entry of the client id list the coordinator
//! assigned. The raw fields are converted into a [`Role`] once, when the run
//! configuration is loaded.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ConfigError;
use crate::ids::EdgeId;

/// Client id assignment as it appears in run configuration.
///
/// Launchers pass the list JSON-encoded inside a string (`"[9,10]"`);
/// settings files may also carry it as a plain array. Entries are only
/// checked by [`decode`](Self::decode), so both forms fail the same way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientIdList {
    /// Native JSON array.
    Array(Vec<Value>),
    /// JSON array encoded in a string.
    Encoded(String),
}

impl ClientIdList {
    /// Decode into an ordered list of ids.
    pub fn decode(&self) -> Result<Vec<EdgeId>, ConfigError> {
        match self {
            Self::Array(entries) => entries.iter().map(edge_id_entry).collect(),
            Self::Encoded(raw) => {
                let entries: Vec<Value> = serde_json::from_str(raw.trim())
                    .map_err(|e| ConfigError::MalformedClientIdList(format!("{raw:?}: {e}")))?;
                entries.iter().map(edge_id_entry).collect()
            }
        }
    }
}

impl From<Vec<EdgeId>> for ClientIdList {
    fn from(ids: Vec<EdgeId>) -> Self {
        Self::Array(ids.into_iter().map(|id| Value::from(id.get())).collect())
    }
}

fn edge_id_entry(entry: &Value) -> Result<EdgeId, ConfigError> {
    entry
        .as_i64()
        .map(EdgeId::new)
        .ok_or_else(|| ConfigError::MalformedClientIdList(format!("{entry} is not an integer id")))
}

/// Role of this process within the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    /// Rank 0.
    Coordinator {
        /// Configured server id, if any.
        server_id: Option<EdgeId>,
    },
    /// Any rank other than 0. `client_ids` is non-empty.
    Participant {
        /// Ids assigned by the coordinator, in order.
        client_ids: Vec<EdgeId>,
    },
}

impl Role {
    /// Classify a process by rank.
    ///
    /// `server_id` is only consulted for rank 0 and `client_id_list` only for
    /// other ranks.
    pub fn from_rank(
        rank: i64,
        server_id: Option<EdgeId>,
        client_id_list: Option<&ClientIdList>,
    ) -> Result<Self, ConfigError> {
        match rank {
            r if r < 0 => Err(ConfigError::InvalidRank(r)),
            0 => Ok(Self::Coordinator { server_id }),
            _ => {
                let list = client_id_list.ok_or(ConfigError::MissingClientIdList { rank })?;
                Self::participant(list.decode()?)
            }
        }
    }

    /// Build a participant role, rejecting an empty assignment.
    pub fn participant(client_ids: Vec<EdgeId>) -> Result<Self, ConfigError> {
        if client_ids.is_empty() {
            return Err(ConfigError::EmptyClientIdList);
        }
        Ok(Self::Participant { client_ids })
    }

    /// Whether this process is the coordinator.
    pub const fn is_coordinator(&self) -> bool {
        matches!(self, Self::Coordinator { .. })
    }

    /// Edge id this process reports under.
    pub fn edge_id(&self) -> EdgeId {
        match self {
            Self::Coordinator { server_id } => server_id.unwrap_or(EdgeId::COORDINATOR_DEFAULT),
            // non-empty by construction
            Self::Participant { client_ids } => client_ids.first().copied().unwrap_or_default(),
        }
    }
}

/// Resolve the edge id for a process straight from raw configuration fields.
pub fn resolve_edge_id(
    rank: i64,
    server_id: Option<EdgeId>,
    client_id_list: Option<&ClientIdList>,
) -> Result<EdgeId, ConfigError> {
    Role::from_rank(rank, server_id, client_id_list).map(|role| role.edge_id())
}
