//! Measurement sources consulted by the sampler.

mod heap;
mod process;

pub use heap::{AllocatorStats, HeapStats, HeapStatsSource};
pub use process::{ProcessInfoError, ProcessInfoSource, ProcessMemory, SystemProcessInfo};
