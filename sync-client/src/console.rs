//! Console context: the object that owns everything an operator touches.

use crate::config::ConsoleConfig;
use crate::coordinator::{SessionOutcome, SyncCoordinator};
use crate::error::RunError;
use crate::fetch::Fetcher;
use crate::log::LogBuffer;
use crate::simulator::MetricsSimulator;
use std::sync::Arc;
use std::time::Duration;
use twinsync_core::RunParams;
use twinsync_types::{Severity, Side};

/// Operator console.
///
/// Owns the log, the sync coordinator (and through it both proxy lists)
/// and the metrics simulator.
pub struct Console {
    config: ConsoleConfig,
    log: LogBuffer,
    coordinator: SyncCoordinator,
    simulator: MetricsSimulator,
}

impl Console {
    /// Create a console with the given configuration and proxy lists for A and B.
    pub fn new(config: ConsoleConfig, fetcher: Arc<dyn Fetcher>, proxies: [String; 2]) -> Self {
        Self::with_simulator(config, fetcher, proxies, MetricsSimulator::new())
    }

    /// Create a console around an existing simulator (e.g. a seeded one).
    pub fn with_simulator(
        config: ConsoleConfig,
        fetcher: Arc<dyn Fetcher>,
        proxies: [String; 2],
        simulator: MetricsSimulator,
    ) -> Self {
        let log = LogBuffer::new();
        let coordinator =
            SyncCoordinator::with_proxies(fetcher, config.retry_policy(), log.clone(), proxies);
        Self {
            config,
            log,
            coordinator,
            simulator,
        }
    }

    /// Run one sync session. See [`SyncCoordinator::synchronize`].
    pub async fn synchronize(&self, url_a: &str, url_b: &str) -> SessionOutcome {
        self.coordinator.synchronize(url_a, url_b).await
    }

    /// Cancel the active sync session, if any.
    pub fn cancel_sync(&self) -> bool {
        self.coordinator.cancel()
    }

    /// Start a simulated run with the configured parameters.
    pub fn start_run(&self) -> Result<(), RunError> {
        self.start_run_with(self.config.run_params(), self.config.tick_interval())
    }

    /// Start a simulated run.
    ///
    /// Both manual proxy lists must validate; otherwise a single error is
    /// logged and nothing starts.
    pub fn start_run_with(&self, params: RunParams, tick: Duration) -> Result<(), RunError> {
        for side in Side::ALL {
            let result = self.coordinator.validation(side);
            if !result.is_valid {
                let error = RunError::InvalidProxies {
                    side,
                    count: result.invalid_lines.len(),
                };
                self.log
                    .record(format!("Run aborted: {}", error), Severity::Error);
                return Err(error);
            }
        }

        self.simulator.start(params, tick);
        self.log.record(
            format!(
                "Run started: target {}, velocity {}%",
                params.target_count, params.velocity_percent
            ),
            Severity::Info,
        );
        Ok(())
    }

    /// Stop the simulated run. Returns false if none was running.
    pub fn stop_run(&self) -> bool {
        let stopped = self.simulator.stop();
        if stopped {
            self.log.record("Run stopped", Severity::Info);
        }
        stopped
    }

    /// Console configuration.
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Event log.
    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    /// Sync coordinator and proxy lists.
    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    /// Metrics simulator.
    pub fn simulator(&self) -> &MetricsSimulator {
        &self.simulator
    }
}
