//! # sync-types
//!
//! Shared data model for the twinsync operator console.
//!
//! This crate provides the foundational types used across all twinsync crates:
//! - [`Side`] - One of the two independent synchronization targets
//! - [`Severity`], [`LogEntry`] - Leveled, timestamped console log records
//! - [`HistoryPoint`] - One sample of the simulated throughput counter
//! - [`ValidationResult`] - Outcome of checking a proxy list
//! - [`ParseError`] - Error returned when parsing these types from text

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod records;
mod side;

pub use error::ParseError;
pub use records::{HistoryPoint, LogEntry, Severity, ValidationResult};
pub use side::Side;
