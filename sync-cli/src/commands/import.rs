//! Import a manual proxy list.

use anyhow::{Context, Result};
use std::path::Path;
use twinsync_core::validate;
use twinsync_types::Side;

use super::summarize;
use crate::config::ConsoleState;

/// Run the import command.
///
/// The list is stored as given; malformed lines are reported but kept, and
/// block `run` until fixed.
pub async fn run(data_dir: &Path, side: Side, file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut state = ConsoleState::load(data_dir).await?;
    state.set_proxies(side, text.trim_end());
    state
        .save(data_dir)
        .await
        .context("Failed to save proxy list")?;

    let result = validate(state.proxies(side));
    println!("Imported {} list: {}", side, summarize(&result));
    if !result.is_valid {
        println!("Run 'twinsync validate {}' to see the malformed lines.", side_arg(side));
    }

    Ok(())
}

/// Command-line spelling of a side.
pub fn side_arg(side: Side) -> &'static str {
    match side {
        Side::A => "a",
        Side::B => "b",
    }
}
