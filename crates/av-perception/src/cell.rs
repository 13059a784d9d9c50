//! Versioned single-writer / single-reader input cells.
//!
//! Each external input (pose request, goal, objects, lights) owns one cell.
//! The producer replaces the value wholesale with [`SnapshotCell::publish`];
//! the loop takes an `Arc` to the latest value at tick start with
//! [`SnapshotCell::latest`].  The lock is held only for a pointer swap, so a
//! reader never sees a half-written value and a writer never waits on a tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A published value with its producer timestamp and cell version.
#[derive(Debug, PartialEq)]
pub struct Stamped<T> {
    pub value: T,
    /// Simulated time the producer attached to the value.
    pub stamp_secs: f64,
    /// Monotonic per-cell counter, starting at 1 for the first publish.
    pub version: u64,
}

pub struct SnapshotCell<T> {
    slot: Mutex<Option<Arc<Stamped<T>>>>,
    version: AtomicU64,
}

impl<T> SnapshotCell<T> {
    pub fn new() -> Self {
        Self { slot: Mutex::new(None), version: AtomicU64::new(0) }
    }

    /// Replace the current value.  Returns the new version.
    pub fn publish(&self, value: T, stamp_secs: f64) -> u64 {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        *slot = Some(Arc::new(Stamped { value, stamp_secs, version }));
        version
    }

    /// The most recently published value, if any.
    pub fn latest(&self) -> Option<Arc<Stamped<T>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Version of the latest publish (0 = never published).
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

impl<T> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
