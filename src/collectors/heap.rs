//! Allocator-side heap statistics.

/// Statistics reported by the process's memory allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Bytes in spans actively backing allocations.
    pub in_use: u64,

    /// Bytes in live application allocations.
    pub allocated: u64,

    /// Bytes of OS memory the allocator holds, including bookkeeping.
    pub reserved: u64,
}

/// Source of allocator statistics.
///
/// Reading never fails; sources report zero for figures they cannot
/// obtain.
pub trait HeapStatsSource: Send + Sync + 'static {
    /// Returns current allocator statistics.
    fn heap_stats(&self) -> HeapStats;
}

/// Reads statistics from the global allocator.
///
/// With the `jemalloc` feature enabled and jemalloc installed as the
/// global allocator, this reports jemalloc's `stats.active`,
/// `stats.allocated` and `stats.resident`. Without it, every figure
/// reads as zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllocatorStats;

impl AllocatorStats {
    /// Creates a new allocator-backed source.
    pub fn new() -> Self {
        Self
    }
}

impl HeapStatsSource for AllocatorStats {
    fn heap_stats(&self) -> HeapStats {
        read_heap_stats()
    }
}

#[cfg(all(unix, feature = "jemalloc"))]
fn read_heap_stats() -> HeapStats {
    use tikv_jemalloc_ctl::{epoch, stats};

    // Advance the epoch to get fresh stats
    if epoch::advance().is_err() {
        return HeapStats::default();
    }

    HeapStats {
        in_use: stats::active::read().unwrap_or(0) as u64,
        allocated: stats::allocated::read().unwrap_or(0) as u64,
        reserved: stats::resident::read().unwrap_or(0) as u64,
    }
}

#[cfg(not(all(unix, feature = "jemalloc")))]
fn read_heap_stats() -> HeapStats {
    HeapStats::default()
}
