//! In-process memory telemetry.
//!
//! Periodically samples the process's memory usage (allocator
//! statistics and OS resident set size), keeps the most recent sample
//! in a single-slot snapshot store, and reports it through the [`log`]
//! facade on an independent cadence. Optionally enforces a soft ceiling
//! on resident memory by pushing the allocator to shed retained pages.
//!
//! # Overview
//!
//! - [`track`] starts a sampler and a reporter on background threads.
//! - [`track_and_limit`] adds a limiter that reacts to a resident-size
//!   ceiling.
//! - [`track_with_config`] exposes sinks and measurement sources for
//!   callers that need to reroute or fake them.
//!
//! The tasks run until the process exits; starting them a second time
//! has no effect. Failures never propagate: a failed sample goes to the
//! configured error sink and the previous snapshot stays current.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::time::Duration;
//!
//! // Refresh the snapshot every 5 seconds, report once a minute.
//! memtrack::track(Duration::from_secs(5), Duration::from_secs(60));
//! ```
//!
//! With a resident-size ceiling of 512 MB, checked every 10 seconds:
//!
//! ```rust,ignore
//! use std::time::Duration;
//!
//! memtrack::track_and_limit(
//!     Duration::from_secs(5),
//!     Duration::from_secs(60),
//!     Duration::from_secs(10),
//!     512_000_000,
//! );
//! ```
//!
//! # Allocator statistics
//!
//! Heap figures come from jemalloc and require the `jemalloc` feature
//! together with jemalloc installed as the global allocator (for
//! example via `tikv-jemallocator`); without that, heap figures read as
//! zero and only the resident set size carries signal.

#![warn(missing_docs)]

mod collectors;
mod config;
mod reclaim;
mod sink;
mod snapshot;
mod tracker;
mod units;

pub use collectors::{
    AllocatorStats, HeapStats, HeapStatsSource, ProcessInfoError, ProcessInfoSource,
    ProcessMemory, SystemProcessInfo,
};
pub use config::{ErrorSink, MemoryLimit, TrackingConfig};
pub use reclaim::{AllocatorReclaimer, Reclaimer};
pub use sink::{CaptureSink, LogSink, TelemetrySink};
pub use snapshot::MemorySnapshot;
pub use tracker::{track, track_and_limit, track_with_config};
pub use units::format_bytes;
