//! Run the metrics simulator.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use twinsync_client::{Console, ConsoleConfig, Fetcher, RelayFetcher};
use twinsync_types::HistoryPoint;

use crate::config::ConsoleState;

/// Width of the widest bar in the history chart.
const CHART_WIDTH: usize = 40;

/// Command-line overrides for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop after this many ticks.
    pub ticks: Option<u64>,
    /// Override for `simulator.target_count`.
    pub target: Option<u64>,
    /// Override for `simulator.velocity_percent`.
    pub velocity: Option<u32>,
    /// Override for `simulator.tick_secs`.
    pub tick_secs: Option<f64>,
    /// Write the run log to this file.
    pub log_file: Option<PathBuf>,
}

/// Run the run command.
///
/// Both stored proxy lists must validate. The simulator then runs until the
/// tick limit or Ctrl-C, and the history is printed as a chart.
pub async fn run(data_dir: &Path, mut config: ConsoleConfig, options: RunOptions) -> Result<()> {
    if let Some(target) = options.target {
        config.simulator.target_count = target;
    }
    if let Some(velocity) = options.velocity {
        config.simulator.velocity_percent = velocity;
    }
    if let Some(tick_secs) = options.tick_secs {
        config.simulator.tick_secs = tick_secs;
    }
    config.validate()?;

    let state = ConsoleState::load(data_dir).await?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(
        RelayFetcher::new(&config.sync.relay_endpoint).context("Failed to create HTTP client")?,
    );
    let console = Console::new(config, fetcher, state.proxy_lists());

    if let Err(e) = console.start_run() {
        for entry in console.log().entries() {
            println!("{}", entry);
        }
        return Err(e.into());
    }
    println!(
        "Run started (tick every {}s). Press Ctrl-C to stop.",
        console.config().simulator.tick_secs
    );

    let mut ticks = console.simulator().subscribe();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while options.ticks.map_or(true, |limit| *ticks.borrow() < limit) {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = ticks.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = console.simulator().snapshot();
                if let Some(point) = snapshot.history.last() {
                    println!(
                        "[{}] total {}  success {:.1}%  threads {}",
                        point.time, point.value, snapshot.success_rate, snapshot.threads
                    );
                }
            }
        }
    }

    console.stop_run();

    let snapshot = console.simulator().snapshot();
    println!();
    print!("{}", render_chart(&snapshot.history, CHART_WIDTH));

    if let Some(path) = &options.log_file {
        console
            .log()
            .export(path)
            .await
            .with_context(|| format!("Failed to export log to {}", path.display()))?;
        println!("Log written to {}", path.display());
    }

    Ok(())
}

/// Render the history as a horizontal bar chart, one line per point.
///
/// Bars are scaled between the smallest and largest value so growth stays
/// visible on large counters; the smallest value gets a single cell.
pub fn render_chart(history: &[HistoryPoint], width: usize) -> String {
    let Some(min) = history.iter().map(|p| p.value).min() else {
        return "(no history)\n".to_string();
    };
    let max = history.iter().map(|p| p.value).max().unwrap_or(min);
    let span = max - min;
    let width = width.max(1);

    let mut chart = String::new();
    for point in history {
        let cells = if span == 0 {
            width
        } else {
            1 + ((point.value - min) as u128 * (width as u128 - 1) / span as u128) as usize
        };
        chart.push_str(&format!(
            "{}  {:<width$}  {}\n",
            point.time,
            "#".repeat(cells),
            point.value,
            width = width
        ));
    }
    chart
}
