//! Error hierarchy for the profiler.
//!
//! - [`ConfigError`]: identity fields missing or malformed for the caller's rank.
//!   Raised before any publish is attempted.
//! - [`TransportError`]: broker connection or publish failure. Never retried here.
//! - [`ProfilerError`]: union of the two, returned where both can occur.

use thiserror::Error;

/// Run configuration could not be turned into an identity.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No run id was configured.
    #[error("run_id is required")]
    MissingRunId,
    /// Rank was negative.
    #[error("rank must be non-negative, got {0}")]
    InvalidRank(i64),
    /// A participant rank had no client id list.
    #[error("client_id_list is required for rank {rank}")]
    MissingClientIdList {
        /// Rank of the participant.
        rank: i64,
    },
    /// The client id list decoded to zero entries.
    #[error("client_id_list is empty")]
    EmptyClientIdList,
    /// The client id list could not be decoded.
    #[error("client_id_list is malformed: {0}")]
    MalformedClientIdList(String),
}

/// Failure reported by the broker transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The broker connection could not be opened.
    #[error("failed to connect to broker: {0}")]
    Connect(String),
    /// A publish call failed.
    #[error("publish to {topic} failed: {reason}")]
    Publish {
        /// Topic the message was addressed to.
        topic: String,
        /// Transport-supplied reason.
        reason: String,
    },
    /// The payload could not be serialized.
    #[error("failed to serialize event payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Any error the profiler can surface to a caller.
#[derive(Debug, Error)]
pub enum ProfilerError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ProfilerError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::Transport(TransportError::Connect(_)) => "connect",
            Self::Transport(TransportError::Publish { .. }) => "publish",
            Self::Transport(TransportError::Serialization(_)) => "serialization",
        }
    }
}

/// Result type for profiler operations.
pub type Result<T> = std::result::Result<T, ProfilerError>;
