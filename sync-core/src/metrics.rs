//! Synthetic throughput model behind the console chart.
//!
//! While a run is active, each tick grows a cumulative counter by a noisy
//! fraction of the configured target and records the new total in a bounded
//! history. Auxiliary gauges (success rate, thread count) wander inside fixed
//! bands. Timing is not handled here: the caller decides when to tick and
//! supplies both the time label and the random source.

use rand::Rng;
use std::ops::Range;
use twinsync_types::HistoryPoint;

use crate::buffer::{BoundedBuffer, HISTORY_CAPACITY};

/// Lowest thread count reachable while running.
pub const FLOOR_THREADS: u32 = 80;

/// Success rate shown while idle.
pub const IDLE_SUCCESS_RATE: f64 = 100.0;

const JITTER: Range<f64> = 0.8..1.2;
const SUCCESS_RATE_BAND: Range<f64> = 94.0..99.9;
const INITIAL_THREADS: Range<u32> = 120..170;
const THREAD_NUDGE: Range<i64> = -5..5;

/// Operator-supplied parameters of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    /// Seed value of the cumulative counter.
    pub target_count: u64,
    /// Share of the target added per tick, in percent.
    pub velocity_percent: u32,
}

impl RunParams {
    /// Increment for one tick given a jitter factor `r`.
    ///
    /// Formula: floor(target_count * velocity_percent / 100 * r)
    pub fn increment(&self, r: f64) -> u64 {
        let raw = self.target_count as f64 * (f64::from(self.velocity_percent) / 100.0) * r;
        raw.floor() as u64
    }
}

/// State of the simulated run.
#[derive(Debug, Clone)]
pub struct MetricsModel {
    running: bool,
    params: RunParams,
    total: u64,
    success_rate: f64,
    threads: u32,
    history: BoundedBuffer<HistoryPoint>,
}

impl MetricsModel {
    /// Create an idle model with an empty history.
    pub fn new() -> Self {
        Self {
            running: false,
            params: RunParams {
                target_count: 0,
                velocity_percent: 0,
            },
            total: 0,
            success_rate: IDLE_SUCCESS_RATE,
            threads: 0,
            history: BoundedBuffer::new(HISTORY_CAPACITY),
        }
    }

    /// Begin a run: seed the counter and history, spin up threads.
    ///
    /// Starting an already running model restarts it.
    pub fn start<R: Rng + ?Sized>(&mut self, params: RunParams, label: impl Into<String>, rng: &mut R) {
        self.running = true;
        self.params = params;
        self.total = params.target_count;
        self.threads = rng.gen_range(INITIAL_THREADS);
        self.history.reset_to(HistoryPoint::new(label, self.total));
    }

    /// Advance one tick. Returns the appended point, or `None` while idle.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        label: impl Into<String>,
        rng: &mut R,
    ) -> Option<HistoryPoint> {
        if !self.running {
            return None;
        }

        let increment = self.params.increment(rng.gen_range(JITTER));
        self.total = self.total.saturating_add(increment);

        let point = HistoryPoint::new(label, self.total);
        self.history.push(point.clone());

        self.success_rate = rng.gen_range(SUCCESS_RATE_BAND);
        let nudged = i64::from(self.threads) + rng.gen_range(THREAD_NUDGE);
        self.threads = nudged.max(i64::from(FLOOR_THREADS)) as u32;

        Some(point)
    }

    /// End the run. Returns false if the model was already idle.
    ///
    /// The counter and history are kept so the chart still shows the last run.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.threads = 0;
        self.success_rate = IDLE_SUCCESS_RATE;
        true
    }

    /// Drop every history point.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Check if a run is active.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Parameters of the current or last run.
    pub fn params(&self) -> RunParams {
        self.params
    }

    /// Cumulative counter value.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Current success rate, in percent.
    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    /// Current thread count.
    pub fn threads(&self) -> u32 {
        self.threads
    }

    /// History drawn by the chart, oldest first.
    pub fn history(&self) -> &BoundedBuffer<HistoryPoint> {
        &self.history
    }
}

impl Default for MetricsModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params() -> RunParams {
        RunParams {
            target_count: 100_000,
            velocity_percent: 33,
        }
    }

    fn started(seed: u64) -> (MetricsModel, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut model = MetricsModel::new();
        model.start(params(), "00:00:00", &mut rng);
        (model, rng)
    }

    #[test]
    fn new_model_is_idle() {
        let model = MetricsModel::new();
        assert!(!model.is_running());
        assert_eq!(model.threads(), 0);
        assert_eq!(model.success_rate(), IDLE_SUCCESS_RATE);
        assert!(model.history().is_empty());
    }

    #[test]
    fn start_seeds_total_and_history() {
        let (model, _) = started(1);

        assert!(model.is_running());
        assert_eq!(model.total(), 100_000);
        assert_eq!(model.history().to_vec(), vec![HistoryPoint::new("00:00:00", 100_000)]);
        assert!((120..170).contains(&model.threads()));
    }

    #[test]
    fn single_tick_lands_in_expected_range() {
        for seed in 0..200 {
            let (mut model, mut rng) = started(seed);
            let point = model.tick("00:00:30", &mut rng).unwrap();

            assert!(
                (126_400..=139_600).contains(&point.value),
                "seed {seed}: total {} out of range",
                point.value
            );
            assert_eq!(model.total(), point.value);
        }
    }

    #[test]
    fn increment_formula_floors() {
        let p = params();
        assert_eq!(p.increment(0.8), 26_400);
        assert_eq!(p.increment(1.0), 33_000);
        assert_eq!(RunParams { target_count: 7, velocity_percent: 50 }.increment(1.0), 3);
    }

    #[test]
    fn history_is_capped_and_seed_evicted() {
        let (mut model, mut rng) = started(7);
        for i in 0..30 {
            model.tick(format!("t{i}"), &mut rng);
        }

        assert_eq!(model.history().len(), HISTORY_CAPACITY);
        assert_ne!(model.history().first().unwrap().value, 100_000);
        assert_eq!(model.history().last().unwrap().value, model.total());
    }

    #[test]
    fn gauges_stay_in_bands_while_running() {
        let (mut model, mut rng) = started(11);
        for _ in 0..500 {
            model.tick("t", &mut rng);
            assert!((94.0..99.9).contains(&model.success_rate()));
            assert!(model.threads() >= FLOOR_THREADS);
        }
    }

    #[test]
    fn tick_while_idle_emits_nothing() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut model = MetricsModel::new();
        assert!(model.tick("t", &mut rng).is_none());
        assert!(model.history().is_empty());
    }

    #[test]
    fn stop_resets_gauges_and_is_idempotent() {
        let (mut model, mut rng) = started(5);
        model.tick("t", &mut rng);

        assert!(model.stop());
        assert_eq!(model.threads(), 0);
        assert_eq!(model.success_rate(), IDLE_SUCCESS_RATE);
        assert!(!model.stop());

        let len = model.history().len();
        assert!(model.tick("t", &mut rng).is_none());
        assert_eq!(model.history().len(), len);
    }

    #[test]
    fn restart_reseeds_history() {
        let (mut model, mut rng) = started(9);
        for _ in 0..5 {
            model.tick("t", &mut rng);
        }
        model.stop();

        model.start(params(), "01:00:00", &mut rng);

        assert_eq!(model.total(), 100_000);
        assert_eq!(model.history().len(), 1);
    }

    #[test]
    fn clear_history_keeps_run_going() {
        let (mut model, mut rng) = started(2);
        model.clear_history();

        assert!(model.history().is_empty());
        model.tick("t", &mut rng);
        assert_eq!(model.history().len(), 1);
    }
}
