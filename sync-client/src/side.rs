//! Per-side slot: the fetch state and the proxy list text of one cluster.

use crate::lock;
use std::sync::Mutex;
use twinsync_core::{validate, Action, RetryPolicy, SourceEvent, SourceState};
use twinsync_types::{Side, ValidationResult};

/// State owned by one side of the console.
///
/// The state machine is only advanced through [`SideSlot::apply`], which
/// runs the pure transition from sync-core under the slot's lock.
#[derive(Debug)]
pub struct SideSlot {
    side: Side,
    state: Mutex<SourceState>,
    proxies: Mutex<String>,
}

impl SideSlot {
    /// Create an idle slot holding the given proxy list text.
    pub fn new(side: Side, proxies: impl Into<String>) -> Self {
        Self {
            side,
            state: Mutex::new(SourceState::Idle),
            proxies: Mutex::new(proxies.into()),
        }
    }

    /// Which side this slot belongs to.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Current fetch state.
    pub fn state(&self) -> SourceState {
        *lock(&self.state)
    }

    /// Feed an event to the state machine and return the actions to run.
    pub fn apply(&self, event: SourceEvent, policy: &RetryPolicy) -> Vec<Action> {
        let mut state = lock(&self.state);
        let previous = *state;
        let (next, actions) = previous.on_event(event, policy);
        if next != previous {
            tracing::debug!(side = %self.side, from = %previous, to = %next, "state transition");
        }
        *state = next;
        actions
    }

    /// Current proxy list text.
    pub fn proxies(&self) -> String {
        lock(&self.proxies).clone()
    }

    /// Replace the proxy list text.
    pub fn set_proxies(&self, text: impl Into<String>) {
        *lock(&self.proxies) = text.into();
    }

    /// Validate the current proxy list text.
    pub fn validation(&self) -> ValidationResult {
        validate(&lock(&self.proxies))
    }
}
