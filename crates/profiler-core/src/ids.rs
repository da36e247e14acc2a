//! Run and edge identifiers.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a distributed run.
///
/// Launchers hand this out either as a number or as an opaque string. The
/// original JSON form is kept so the `run_id` field on the wire matches what
/// the run was configured with.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunId {
    /// Numeric run id (`"runId": 42`).
    Numeric(i64),
    /// String run id (`"runId": "r1"`).
    Text(String),
}

impl RunId {
    /// Parse a run id from text, preferring the numeric form.
    ///
    /// Used for values that arrive untyped (environment variables, CLI flags).
    pub fn parse_lossy(s: &str) -> Self {
        s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_owned()), Self::Numeric)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RunId {
    fn from(n: i64) -> Self {
        Self::Numeric(n)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for RunId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Identifier of a participant (coordinator or client) within a run.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(i64);

impl EdgeId {
    /// Edge id a coordinator reports when no server id is configured.
    pub const COORDINATOR_DEFAULT: Self = Self(0);

    /// Wrap a raw edge id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw integer value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EdgeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for EdgeId {
    type Err = ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
