//! Metrics simulator: drives the metrics model on a fixed period.
//!
//! The schedule is an explicit start/stop pair. `stop` is synchronous and
//! idempotent, and no point is emitted once it returns.

use crate::lock;
use crate::log::time_label;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use twinsync_core::{MetricsModel, RunParams};
use twinsync_types::HistoryPoint;

/// Point-in-time view of the simulator, as drawn by the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    /// Whether a run is in progress.
    pub running: bool,
    /// Cumulative counter.
    pub total: u64,
    /// Success rate gauge, in percent.
    pub success_rate: f64,
    /// Active threads gauge.
    pub threads: u32,
    /// Bounded history, oldest first.
    pub history: Vec<HistoryPoint>,
}

struct SimState {
    model: MetricsModel,
    rng: StdRng,
    ticks: watch::Sender<u64>,
}

struct Ticker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Ticker {
    fn halt(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

/// Periodic generator of synthetic run metrics.
pub struct MetricsSimulator {
    state: Arc<Mutex<SimState>>,
    ticker: Mutex<Option<Ticker>>,
}

impl MetricsSimulator {
    /// Create a simulator seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a simulator with a fixed seed (reproducible samples).
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        let (ticks, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(SimState {
                model: MetricsModel::new(),
                rng,
                ticks,
            })),
            ticker: Mutex::new(None),
        }
    }

    /// Start a run, replacing any run in progress.
    ///
    /// The first point after the seed is emitted one full period after start.
    /// Must be called from within a tokio runtime.
    pub fn start(&self, params: RunParams, tick: Duration) {
        let mut ticker = lock(&self.ticker);
        if let Some(previous) = ticker.take() {
            previous.halt();
        }

        {
            let mut state = lock(&self.state);
            let SimState { model, rng, .. } = &mut *state;
            model.start(params, time_label(), rng);
        }

        // interval_at panics on a zero period
        let period = tick.max(Duration::from_millis(1));
        let token = CancellationToken::new();
        let state = Arc::clone(&self.state);
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = timer.tick() => {}
                }

                let mut guard = lock(&state);
                // Halted while waiting for the lock; the model may belong to a new run
                if task_token.is_cancelled() {
                    break;
                }
                let SimState { model, rng, ticks } = &mut *guard;
                match model.tick(time_label(), rng) {
                    Some(point) => {
                        tracing::debug!(time = %point.time, total = point.value, "metrics tick");
                        ticks.send_modify(|count| *count += 1);
                    }
                    None => break,
                }
            }
        });

        tracing::info!(
            target_count = params.target_count,
            velocity_percent = params.velocity_percent,
            "Simulator started (tick: {:?})",
            period
        );
        *ticker = Some(Ticker { token, handle });
    }

    /// Stop the run. Returns false if no run was in progress.
    ///
    /// Synchronous: once this returns, no further points are emitted.
    pub fn stop(&self) -> bool {
        if let Some(ticker) = lock(&self.ticker).take() {
            ticker.halt();
        }
        let stopped = lock(&self.state).model.stop();
        if stopped {
            tracing::info!("Simulator stopped");
        }
        stopped
    }

    /// Check if a run is in progress.
    pub fn is_running(&self) -> bool {
        lock(&self.state).model.is_running()
    }

    /// Current metrics and history.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = lock(&self.state);
        let model = &state.model;
        MetricsSnapshot {
            running: model.is_running(),
            total: model.total(),
            success_rate: model.success_rate(),
            threads: model.threads(),
            history: model.history().to_vec(),
        }
    }

    /// Drop every history point.
    pub fn clear_history(&self) {
        lock(&self.state).model.clear_history();
    }

    /// Receiver notified with the number of points emitted since creation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        lock(&self.state).ticks.subscribe()
    }
}

impl Default for MetricsSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MetricsSimulator {
    fn drop(&mut self) {
        if let Some(ticker) = lock(&self.ticker).take() {
            ticker.halt();
        }
    }
}
