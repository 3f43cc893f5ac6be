//! # sync-core
//!
//! Pure logic for twinsync (no I/O, instant tests).
//!
//! This crate implements the state machines and algorithms for the operator
//! console without any network, disk or timer I/O, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. Randomness is injected by the caller as an
//! [`rand::Rng`], so even the metrics model is deterministic under a seeded
//! generator.
//!
//! The actual I/O (HTTP fetches, backoff sleeps, periodic ticks) is performed
//! by `sync-client`, which interprets the actions produced by these state
//! machines.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod metrics;
pub mod retry;
pub mod state;
pub mod validator;

pub use buffer::{BoundedBuffer, HISTORY_CAPACITY, LOG_CAPACITY};
pub use metrics::{MetricsModel, RunParams, FLOOR_THREADS};
pub use retry::RetryPolicy;
pub use state::{Action, FetchFailure, SourceEvent, SourceState};
pub use validator::{filter_valid, is_valid_line, validate, FilteredLines};
