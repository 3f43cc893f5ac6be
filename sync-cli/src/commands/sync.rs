//! Run one sync session.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use twinsync_client::{Console, ConsoleConfig, Fetcher, RelayFetcher, SessionOutcome};
use twinsync_types::Side;

use crate::config::ConsoleState;

/// Run the sync command.
///
/// Ctrl-C cancels the session. Lists are persisted whatever the outcome.
pub async fn run(
    data_dir: &Path,
    config: ConsoleConfig,
    url_a: Option<String>,
    url_b: Option<String>,
    log_file: Option<&Path>,
) -> Result<()> {
    let mut state = ConsoleState::load(data_dir).await?;
    if let Some(url) = url_a {
        state.set_url(Side::A, url.trim());
    }
    if let Some(url) = url_b {
        state.set_url(Side::B, url.trim());
    }

    let fetcher: Arc<dyn Fetcher> = Arc::new(
        RelayFetcher::new(&config.sync.relay_endpoint).context("Failed to create HTTP client")?,
    );
    let console = Arc::new(Console::new(config, fetcher, state.proxy_lists()));

    let interrupt = {
        let console = Arc::clone(&console);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                console.cancel_sync();
            }
        })
    };

    let outcome = console.synchronize(&state.url_a, &state.url_b).await;
    interrupt.abort();

    for entry in console.log().entries() {
        println!("{}", entry);
    }
    println!();
    for side in Side::ALL {
        println!("  {}: {}", side, console.coordinator().state(side));
        state.set_proxies(side, console.coordinator().proxies(side));
    }

    state
        .save(data_dir)
        .await
        .context("Failed to save console state")?;

    if let Some(path) = log_file {
        console
            .log()
            .export(path)
            .await
            .with_context(|| format!("Failed to export log to {}", path.display()))?;
        println!("Log written to {}", path.display());
    }

    match outcome {
        SessionOutcome::Completed { updates } if updates.is_empty() => {
            anyhow::bail!("sync finished without updating either cluster")
        }
        SessionOutcome::Completed { .. } | SessionOutcome::Cancelled => Ok(()),
        SessionOutcome::NoSources => {
            anyhow::bail!("no source URL configured; run 'twinsync sources' first")
        }
        SessionOutcome::AlreadyActive => anyhow::bail!("a sync session is already active"),
        SessionOutcome::Failed(message) => anyhow::bail!("sync failed: {}", message),
    }
}
