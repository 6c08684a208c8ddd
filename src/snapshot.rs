//! Snapshot protocol type and the single-slot latest-value store.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// One internally consistent set of memory measurements.
///
/// Snapshots are immutable once published; a newer snapshot replaces the
/// previous one wholesale. All quantities are in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    /// Bytes of heap memory in active use by live allocations,
    /// including allocator span overhead.
    pub heap_in_use: u64,

    /// Bytes currently allocated by the application.
    pub heap_allocated: u64,

    /// Bytes the allocator has obtained from the operating system,
    /// including bookkeeping structures.
    pub system_reserved: u64,

    /// OS-reported resident set size: physical memory currently
    /// attributed to the process.
    pub resident_set_size: u64,
}

/// Holds the most recently published [`MemorySnapshot`].
///
/// A single writer replaces the slot on every publish; any number of
/// readers copy the current value out. Readers either see a complete
/// snapshot or none at all, and `current` returns `None` only before
/// the first publish.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    slot: RwLock<Option<MemorySnapshot>>,
}

impl SnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a snapshot, replacing any previous one.
    pub fn publish(&self, snapshot: MemorySnapshot) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(snapshot);
    }

    /// Returns a copy of the latest snapshot, if one was ever published.
    pub fn current(&self) -> Option<MemorySnapshot> {
        *self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }
}
