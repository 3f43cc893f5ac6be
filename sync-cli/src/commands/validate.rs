//! Validate a stored proxy list.

use anyhow::Result;
use std::path::Path;
use twinsync_core::validate;
use twinsync_types::Side;

use super::summarize;
use crate::config::ConsoleState;

/// Run the validate command. Fails when the list has malformed lines.
pub async fn run(data_dir: &Path, side: Side) -> Result<()> {
    let state = ConsoleState::load(data_dir).await?;
    let result = validate(state.proxies(side));

    println!("{}: {}", side, summarize(&result));
    for line in &result.invalid_lines {
        println!("  invalid: {}", line);
    }

    if !result.is_valid {
        anyhow::bail!(
            "{} has {} invalid proxy line(s)",
            side,
            result.invalid_lines.len()
        );
    }
    Ok(())
}
