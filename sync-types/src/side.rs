//! Side identity for the two synchronization targets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// One of the two independent synchronization targets.
///
/// Each side owns its own source URL, proxy list and source state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Cluster A.
    A,
    /// Cluster B.
    B,
}

impl Side {
    /// Both sides in display order.
    pub const ALL: [Side; 2] = [Side::A, Side::B];

    /// Position of this side in per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    /// Human-readable label used in log messages.
    pub fn label(self) -> &'static str {
        match self {
            Side::A => "Cluster A",
            Side::B => "Cluster B",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Side {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Side::A),
            "b" => Ok(Side::B),
            other => Err(ParseError::UnknownSide(other.to_string())),
        }
    }
}
