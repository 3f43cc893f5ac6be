//! Set source URLs.

use anyhow::{Context, Result};
use std::path::Path;
use twinsync_types::Side;

use crate::config::ConsoleState;

/// Run the sources command.
///
/// Without flags, prints the stored URLs.
pub async fn run(data_dir: &Path, url_a: Option<String>, url_b: Option<String>) -> Result<()> {
    let mut state = ConsoleState::load(data_dir).await?;
    let changed = url_a.is_some() || url_b.is_some();

    if let Some(url) = url_a {
        state.set_url(Side::A, url.trim());
    }
    if let Some(url) = url_b {
        state.set_url(Side::B, url.trim());
    }

    if changed {
        state
            .save(data_dir)
            .await
            .context("Failed to save source URLs")?;
        println!("Sources updated.");
    }

    for side in Side::ALL {
        let url = state.url(side);
        println!(
            "  {}: {}",
            side,
            if url.is_empty() { "(not set)" } else { url }
        );
    }

    Ok(())
}
