//! Per-side source state machine for twinsync.
//!
//! This module provides a pure, side-effect-free state machine for one side's
//! fetch lifecycle. The state machine takes events as input and produces
//! a new state plus a list of actions to execute.
//!
//! The actual I/O (fetching, sleeping, logging) is performed by sync-client,
//! not by this module. This enables instant unit testing without network mocks.

use std::fmt;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Source state machine - NO I/O, just state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceState {
    /// No fetch in progress.
    #[default]
    Idle,
    /// First attempt in flight.
    Syncing,
    /// A later attempt in flight, or waiting out a backoff.
    Retrying,
    /// Last session fetched this side successfully.
    Success,
    /// Last session exhausted every attempt for this side.
    Error,
    /// Side was cancelled. Session cancellation resets in-flight sides to
    /// [`SourceState::Idle`] instead, so this is never entered by
    /// [`SourceState::on_event`].
    Cancelled,
}

impl SourceState {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self::Idle
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (sync-client)
    /// is responsible for executing the returned actions.
    pub fn on_event(self, event: SourceEvent, policy: &RetryPolicy) -> (Self, Vec<Action>) {
        match (self, event) {
            // Session start clears the previous outcome
            (state, SourceEvent::SessionStarted) if state.is_terminal() => (Self::Idle, vec![]),

            // First attempt
            (Self::Idle, SourceEvent::AttemptStarted { attempt: 0 }) => (Self::Syncing, vec![]),

            // Later attempts
            (Self::Syncing | Self::Retrying, SourceEvent::AttemptStarted { attempt })
                if attempt > 0 =>
            {
                (Self::Retrying, vec![])
            }

            // Attempt outcome
            (Self::Syncing | Self::Retrying, SourceEvent::FetchSucceeded) => {
                (Self::Success, vec![Action::Deliver])
            }
            (state @ (Self::Syncing | Self::Retrying), SourceEvent::FetchFailed { attempt, failure }) => {
                let report = Action::ReportFailure {
                    attempt,
                    failure,
                };
                if policy.is_final(attempt) {
                    (
                        Self::Error,
                        vec![
                            report,
                            Action::GiveUp {
                                attempts: attempt.saturating_add(1),
                            },
                        ],
                    )
                } else {
                    (
                        state,
                        vec![
                            report,
                            Action::Backoff {
                                delay: policy.delay_for(attempt),
                            },
                        ],
                    )
                }
            }

            // Operator cancellation
            (Self::Syncing | Self::Retrying, SourceEvent::SessionCancelled) => (Self::Idle, vec![]),

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Check if a fetch is in progress.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Syncing | Self::Retrying)
    }

    /// Check if the side finished its last session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Cancelled)
    }

    /// Lower-case name used in status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Syncing => "syncing",
            Self::Retrying => "retrying",
            Self::Success => "success",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single fetch attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The request never produced a response.
    Transport(String),
    /// The response carried a non-success status.
    Status(u16),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Transport(error) => write!(f, "network error: {}", error),
            FetchFailure::Status(status) => write!(f, "HTTP status {}", status),
        }
    }
}

/// Events that can occur in a side's fetch lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// A new sync session began.
    SessionStarted,
    /// An attempt is about to be made.
    AttemptStarted {
        /// Attempt index, starting at 0.
        attempt: u32,
    },
    /// The attempt received an ok response.
    FetchSucceeded,
    /// The attempt failed.
    FetchFailed {
        /// Attempt index, starting at 0.
        attempt: u32,
        /// What went wrong.
        failure: FetchFailure,
    },
    /// The operator cancelled the session.
    SessionCancelled,
}

/// Actions to be executed by the sync-client.
///
/// These are instructions, not side effects. The sync-client interprets
/// these and performs the actual I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Hand the fetched body to the coordinator.
    Deliver,
    /// Log a warning for a failed attempt.
    ReportFailure {
        /// Attempt index, starting at 0.
        attempt: u32,
        /// What went wrong.
        failure: FetchFailure,
    },
    /// Wait before the next attempt.
    Backoff {
        /// Delay before the next attempt.
        delay: Duration,
    },
    /// Stop retrying and log a terminal failure.
    GiveUp {
        /// Number of attempts made.
        attempts: u32,
    },
}
