//! Error types for twinsync data model parsing.

use thiserror::Error;

/// Errors that can occur when parsing model types from operator input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Side label was neither `a` nor `b`
    #[error("unknown side: {0} (expected 'a' or 'b')")]
    UnknownSide(String),
}
