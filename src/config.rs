//! Configuration for memory tracking.

use std::sync::Arc;
use std::time::Duration;

use crate::collectors::{
    AllocatorStats, HeapStatsSource, ProcessInfoError, ProcessInfoSource, SystemProcessInfo,
};
use crate::reclaim::{AllocatorReclaimer, Reclaimer};
use crate::sink::{LogSink, TelemetrySink};

/// Callback receiving sampling failures.
pub type ErrorSink = Arc<dyn Fn(&ProcessInfoError) + Send + Sync>;

/// Soft ceiling on the process's resident set size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryLimit {
    /// How often the resident size is checked against the ceiling.
    pub period: Duration,

    /// The ceiling, in bytes.
    pub max_bytes: u64,
}

/// Configuration for the background tracking tasks.
#[derive(Clone)]
pub struct TrackingConfig {
    /// How often a fresh memory snapshot is taken.
    ///
    /// The sampler sleeps this long between ticks, so the effective
    /// period also includes the sampling work itself.
    ///
    /// Default: 10 seconds
    pub refresh_interval: Duration,

    /// How often the latest snapshot is reported through the sink.
    ///
    /// Default: 60 seconds
    pub log_period: Duration,

    /// Resident-size ceiling enforced by the limiter task.
    ///
    /// Default: none (no limiter runs)
    pub limit: Option<MemoryLimit>,

    /// Receives sampling failures.
    ///
    /// Default: log the failure at debug level and carry on.
    pub error_sink: ErrorSink,

    /// Receives formatted telemetry lines.
    ///
    /// Default: [`LogSink`]
    pub sink: Arc<dyn TelemetrySink>,

    /// Source of per-process memory accounting.
    ///
    /// Default: [`SystemProcessInfo`]
    pub process_info: Arc<dyn ProcessInfoSource>,

    /// Source of allocator statistics.
    ///
    /// Default: [`AllocatorStats`]
    pub heap_stats: Arc<dyn HeapStatsSource>,

    /// Reclamation triggers used when the limit is exceeded.
    ///
    /// Default: [`AllocatorReclaimer`]
    pub reclaimer: Arc<dyn Reclaimer>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(10),
            log_period: Duration::from_secs(60),
            limit: None,
            error_sink: Arc::new(|err| {
                log::debug!(target: "memtrack", "failed to sample process memory: {err}");
            }),
            sink: Arc::new(LogSink),
            process_info: Arc::new(SystemProcessInfo),
            heap_stats: Arc::new(AllocatorStats),
            reclaimer: Arc::new(AllocatorReclaimer),
        }
    }
}

impl TrackingConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the snapshot refresh interval.
    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Sets the reporting period.
    #[must_use]
    pub fn with_log_period(mut self, period: Duration) -> Self {
        self.log_period = period;
        self
    }

    /// Enables the limiter with the given check period and ceiling.
    #[must_use]
    pub fn with_limit(mut self, period: Duration, max_bytes: u64) -> Self {
        self.limit = Some(MemoryLimit { period, max_bytes });
        self
    }

    /// Routes sampling failures to the given callback.
    #[must_use]
    pub fn with_error_sink<F>(mut self, error_sink: F) -> Self
    where
        F: Fn(&ProcessInfoError) + Send + Sync + 'static,
    {
        self.error_sink = Arc::new(error_sink);
        self
    }

    /// Routes telemetry lines to the given sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Overrides the process accounting source.
    #[must_use]
    pub fn with_process_info(mut self, process_info: Arc<dyn ProcessInfoSource>) -> Self {
        self.process_info = process_info;
        self
    }

    /// Overrides the allocator statistics source.
    #[must_use]
    pub fn with_heap_stats(mut self, heap_stats: Arc<dyn HeapStatsSource>) -> Self {
        self.heap_stats = heap_stats;
        self
    }

    /// Overrides the reclamation triggers.
    #[must_use]
    pub fn with_reclaimer(mut self, reclaimer: Arc<dyn Reclaimer>) -> Self {
        self.reclaimer = reclaimer;
        self
    }
}

impl std::fmt::Debug for TrackingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingConfig")
            .field("refresh_interval", &self.refresh_interval)
            .field("log_period", &self.log_period)
            .field("limit", &self.limit)
            .finish()
    }
}
