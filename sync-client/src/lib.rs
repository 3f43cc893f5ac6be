//! # sync-client
//!
//! Dual-source sync engine and metrics simulator for twinsync.
//!
//! This is the I/O half of the console: it drives the pure state machines
//! from sync-core with real HTTP fetches, timers and a shared cancellation
//! token.
//!
//! ## Features
//!
//! - **Concurrent Dual Fetch**: both sides start together and overlap their waits
//! - **Bounded Retries**: exponential backoff, no jitter, per-side state machine
//! - **Cooperative Cancellation**: one token per session interrupts requests and backoffs
//! - **Metrics Simulator**: explicit start/stop pair over a bounded history
//! - **Fetcher Abstraction**: pluggable fetch layer (reqwest relay, mock)
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use twinsync_client::{Console, ConsoleConfig, RelayFetcher};
//! use twinsync_types::Side;
//!
//! let config = ConsoleConfig::default();
//! let fetcher = Arc::new(RelayFetcher::new(&config.sync.relay_endpoint)?);
//! let console = Console::new(config, fetcher, [String::new(), String::new()]);
//!
//! console.synchronize("https://example.com/a.txt", "").await;
//! println!("{}", console.coordinator().proxies(Side::A));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod console;
pub mod coordinator;
pub mod error;
pub mod fetch;
pub mod log;
pub mod retry;
pub mod side;
pub mod simulator;

pub use config::{ConfigError, ConsoleConfig, SimulatorSettings, SyncSettings};
pub use console::Console;
pub use coordinator::{SessionOutcome, SideUpdate, SyncCoordinator};
pub use error::{RunError, SyncError};
pub use fetch::{
    FetchError, FetchResponse, Fetcher, MockFetcher, MockReply, RelayFetcher,
    DEFAULT_RELAY_ENDPOINT,
};
pub use log::{time_label, LogBuffer};
pub use retry::fetch_with_retry;
pub use side::SideSlot;
pub use simulator::{MetricsSimulator, MetricsSnapshot};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a std mutex, recovering the data if a holder panicked.
///
/// Every critical section in this crate leaves its data consistent, so a
/// poisoned lock carries no torn state.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
