//! Console records: log entries, history samples and validation results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a console log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine progress information.
    Info,
    /// A completed operation.
    Success,
    /// A recoverable problem or an operator action worth noting.
    Warning,
    /// A failed operation.
    Error,
    /// Simulated traffic chatter.
    Packet,
}

impl Severity {
    /// Upper-case tag used when exporting the log.
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Success => "SUCCESS",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Packet => "PACKET",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A timestamped, leveled console message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock label (`HH:MM:SS`).
    pub timestamp: String,
    /// Message text.
    pub message: String,
    /// Severity level.
    pub severity: Severity,
}

impl LogEntry {
    /// Create a new log entry.
    pub fn new(timestamp: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            timestamp: timestamp.into(),
            message: message.into(),
            severity,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.timestamp, self.severity, self.message)
    }
}

/// One sample of the cumulative counter, as drawn by the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Wall-clock label (`HH:MM:SS`).
    pub time: String,
    /// Cumulative counter value at this point.
    pub value: u64,
}

impl HistoryPoint {
    /// Create a new history point.
    pub fn new(time: impl Into<String>, value: u64) -> Self {
        Self {
            time: time.into(),
            value,
        }
    }
}

/// Outcome of validating a proxy list.
///
/// Derived from the list text and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff `invalid_lines` is empty.
    pub is_valid: bool,
    /// Lines that are not well-formed `address:port` records, in input order.
    pub invalid_lines: Vec<String>,
    /// Number of non-empty lines examined.
    pub total_lines: usize,
}

impl ValidationResult {
    /// Number of lines that passed validation.
    pub fn valid_count(&self) -> usize {
        self.total_lines - self.invalid_lines.len()
    }
}
