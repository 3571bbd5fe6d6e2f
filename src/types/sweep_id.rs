//! Identifiers for individual sweeps.
//!
//! Every sweep gets a `SweepId` so its log lines and its report can be tied
//! together.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for one sweep run (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SweepId(Uuid);

impl SweepId {
    /// Generate a new random sweep ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 characters, for display.
    pub fn short(&self) -> String {
        let mut s = self.0.to_string();
        s.truncate(8);
        s
    }
}

impl Default for SweepId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SweepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SweepId {
    type Err = SweepIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SweepIdError::InvalidFormat(s.to_string()))
    }
}

/// Error type for SweepId parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SweepIdError {
    #[error("invalid sweep ID format: {0}")]
    InvalidFormat(String),
}
