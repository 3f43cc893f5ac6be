//! Show console status.

use anyhow::Result;
use std::path::Path;
use twinsync_client::ConsoleConfig;
use twinsync_core::validate;
use twinsync_types::Side;

use super::summarize;
use crate::config::ConsoleState;

/// Run the status command.
pub async fn run(data_dir: &Path, config: &ConsoleConfig) -> Result<()> {
    let state = ConsoleState::load(data_dir).await?;

    println!("=== twinsync status ===");
    println!();

    for side in Side::ALL {
        let url = state.url(side);
        let result = validate(state.proxies(side));
        println!("{}:", side);
        println!(
            "  Source:  {}",
            if url.is_empty() { "(not set)" } else { url }
        );
        println!("  Proxies: {}", summarize(&result));
        println!();
    }

    println!("Relay:     {}", config.sync.relay_endpoint);
    println!(
        "Retries:   {} (base delay {}ms)",
        config.sync.max_retries, config.sync.base_delay_ms
    );
    println!(
        "Simulator: target {}, velocity {}%, tick {}s",
        config.simulator.target_count, config.simulator.velocity_percent, config.simulator.tick_secs
    );

    if state.url_a.is_empty() && state.url_b.is_empty() {
        println!();
        println!("Run 'twinsync sources --url-a <url> --url-b <url>' to configure sources.");
    }

    Ok(())
}
