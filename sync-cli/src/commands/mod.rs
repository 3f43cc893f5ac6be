//! CLI command implementations.

pub mod import;
pub mod run;
pub mod sources;
pub mod status;
pub mod sync;
pub mod validate;

use twinsync_types::ValidationResult;

/// One-line summary of a proxy list's validation.
pub fn summarize(result: &ValidationResult) -> String {
    if result.total_lines == 0 {
        "empty".to_string()
    } else if result.is_valid {
        format!("{} proxies, all valid", result.total_lines)
    } else {
        format!(
            "{} proxies, {} invalid",
            result.total_lines,
            result.invalid_lines.len()
        )
    }
}
