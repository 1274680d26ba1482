//! Run identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Identifier of one run: assemble, load a fresh context, observe it.
///
/// Run ids are minted in increasing order by a [`RunCounter`] and are
/// carried on every message the context emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(u64);

impl RunId {
    /// Wrap a raw run number.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw run number.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

impl From<u64> for RunId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Monotonic source of run ids. The first id is 1.
#[derive(Debug, Default)]
pub struct RunCounter {
    last: AtomicU64,
}

impl RunCounter {
    /// Create a counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next run id.
    pub fn next(&self) -> RunId {
        RunId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The most recently minted id, if any.
    pub fn current(&self) -> Option<RunId> {
        match self.last.load(Ordering::SeqCst) {
            0 => None,
            n => Some(RunId(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_monotonic() {
        let counter = RunCounter::new();
        assert_eq!(counter.current(), None);

        let first = counter.next();
        let second = counter.next();

        assert_eq!(first.get(), 1);
        assert!(second > first);
        assert_eq!(counter.current(), Some(second));
    }

    #[test]
    fn test_display() {
        assert_eq!(RunId::new(7).to_string(), "run-7");
    }
}
