//! Operator-visible event log.
//!
//! Every record lands in a bounded buffer (oldest evicted first) and is
//! mirrored to `tracing` under the `twinsync::console` target.

use crate::lock;
use std::path::Path;
use std::sync::{Arc, Mutex};
use twinsync_core::{BoundedBuffer, LOG_CAPACITY};
use twinsync_types::{LogEntry, Severity};

/// Wall-clock label used for log entries and history points.
pub fn time_label() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Shared, bounded log of console events.
///
/// Clones share the same buffer.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<BoundedBuffer<LogEntry>>>,
}

impl LogBuffer {
    /// Create a log holding the last 100 entries.
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    /// Create a log with a custom capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BoundedBuffer::new(capacity))),
        }
    }

    /// Append a message. Never blocks on I/O.
    pub fn record(&self, message: impl Into<String>, severity: Severity) {
        let entry = LogEntry::new(time_label(), message, severity);

        match severity {
            Severity::Error => tracing::error!(target: "twinsync::console", "{}", entry.message),
            Severity::Warning => tracing::warn!(target: "twinsync::console", "{}", entry.message),
            Severity::Info | Severity::Success => {
                tracing::info!(target: "twinsync::console", "{}", entry.message)
            }
            Severity::Packet => tracing::debug!(target: "twinsync::console", "{}", entry.message),
        }

        lock(&self.inner).push(entry);
    }

    /// Snapshot of the entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        lock(&self.inner).to_vec()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        lock(&self.inner).is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        lock(&self.inner).clear();
    }

    /// Number of entries with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        lock(&self.inner)
            .iter()
            .filter(|entry| entry.severity == severity)
            .count()
    }

    /// Render the log as text, one `[time] LEVEL message` line per entry.
    pub fn render(&self) -> String {
        let mut text = String::new();
        for entry in lock(&self.inner).iter() {
            text.push_str(&entry.to_string());
            text.push('\n');
        }
        text
    }

    /// Write the rendered log to a file.
    pub async fn export(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let text = self.render();
        tokio::fs::write(path, text).await
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}
