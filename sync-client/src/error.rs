//! Error types for sync-client.

use thiserror::Error;
use twinsync_types::Side;

/// Sync session errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The operator cancelled the session.
    ///
    /// Matched by variant, never by message text.
    #[error("sync session cancelled by operator")]
    Cancelled,

    /// A fetch unit task died unexpectedly.
    #[error("sync task failed: {0}")]
    Task(String),
}

impl SyncError {
    /// Check if this is an operator cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SyncError::Cancelled)
    }
}

/// Errors starting a simulated run.
#[derive(Debug, Error)]
pub enum RunError {
    /// A manual proxy list has malformed lines.
    #[error("{side} has {count} invalid proxy line(s)")]
    InvalidProxies {
        /// The side whose list failed validation.
        side: Side,
        /// Number of invalid lines.
        count: usize,
    },
}
