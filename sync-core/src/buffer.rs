//! Bounded FIFO buffer for twinsync.
//!
//! This module provides an append-only queue with:
//! - FIFO ordering
//! - A fixed capacity; appending to a full buffer evicts the oldest entry
//! - Explicit clearing by the operator
//!
//! The console keeps two of these: the log buffer (100 entries) and the
//! history buffer drawn by the chart (25 entries).

use std::collections::VecDeque;

/// Capacity of the console log buffer.
pub const LOG_CAPACITY: usize = 100;

/// Capacity of the metrics history buffer.
pub const HISTORY_CAPACITY: usize = 25;

/// Fixed-capacity buffer that evicts its oldest entry when full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedBuffer<T> {
    /// Maximum number of entries held.
    capacity: usize,
    /// Entries, oldest first.
    entries: VecDeque<T>,
}

impl<T> BoundedBuffer<T> {
    /// Create an empty buffer holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an entry, returning the evicted oldest entry if the buffer was full.
    ///
    /// A zero-capacity buffer hands the pushed entry straight back.
    pub fn push(&mut self, entry: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(entry);
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Drop every entry and start over with `entry` as the only one.
    pub fn reset_to(&mut self, entry: T) {
        self.entries.clear();
        self.push(entry);
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest entry.
    pub fn first(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Newest entry.
    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

impl<T: Clone> BoundedBuffer<T> {
    /// Copy the entries out, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}
