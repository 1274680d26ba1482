//! Most-recent-first log buffer.

use std::collections::VecDeque;

use crate::entry::LogEntry;

/// Holds log entries newest first, optionally bounded.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: Option<usize>,
}

impl LogBuffer {
    /// Unbounded buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer keeping at most `capacity` entries; the oldest are dropped.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Prepend an entry. Returns how many old entries were dropped.
    pub fn push(&mut self, entry: LogEntry) -> usize {
        self.entries.push_front(entry);
        match self.capacity {
            Some(capacity) if self.entries.len() > capacity => {
                let dropped = self.entries.len() - capacity;
                self.entries.truncate(capacity);
                dropped
            }
            _ => 0,
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter()
    }

    /// Copy of the entries, newest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
