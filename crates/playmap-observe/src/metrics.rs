//! Relay counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counts what the relay did with the messages it received.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    received: AtomicU64,
    appended: AtomicU64,
    rejected: AtomicU64,
    stale: AtomicU64,
    evicted: AtomicU64,
}

impl RelayMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a received message.
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an appended entry and any entries it evicted.
    pub fn record_appended(&self, evicted: usize) {
        self.appended.fetch_add(1, Ordering::Relaxed);
        self.evicted.fetch_add(evicted as u64, Ordering::Relaxed);
    }

    /// Record a malformed message.
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a message from a discarded run.
    pub fn record_stale(&self) {
        self.stale.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of the counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            appended: self.appended.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            stale: self.stale.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
        }
    }

    /// Reset every counter.
    pub fn reset(&self) {
        for counter in [
            &self.received,
            &self.appended,
            &self.rejected,
            &self.stale,
            &self.evicted,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time copy of [`RelayMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Messages received.
    pub received: u64,
    /// Entries appended to the buffer.
    pub appended: u64,
    /// Malformed messages ignored.
    pub rejected: u64,
    /// Messages from earlier runs discarded.
    pub stale: u64,
    /// Entries dropped by the buffer capacity.
    pub evicted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = RelayMetrics::new();
        metrics.record_received();
        metrics.record_received();
        metrics.record_appended(0);
        metrics.record_appended(2);
        metrics.record_rejected();
        metrics.record_stale();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                received: 2,
                appended: 2,
                rejected: 1,
                stale: 1,
                evicted: 2,
            }
        );

        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }
}
