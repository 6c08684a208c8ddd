//! Background tasks: sampling, reporting and limiting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::collectors::{HeapStatsSource, ProcessInfoSource};
use crate::config::{ErrorSink, MemoryLimit, TrackingConfig};
use crate::reclaim::Reclaimer;
use crate::sink::TelemetrySink;
use crate::snapshot::{MemorySnapshot, SnapshotStore};
use crate::units::format_bytes;

// Flipped exactly once per process; never reset.
static TRACKING_STARTED: AtomicBool = AtomicBool::new(false);

/// Starts the background tracking tasks.
///
/// A sampler takes a fresh memory snapshot every `refresh_interval` and
/// a reporter emits the latest snapshot every `log_period`, each on its
/// own thread. At most one set of tracking tasks ever runs per process;
/// only the first effective call across [`track`], [`track_and_limit`]
/// and [`track_with_config`] starts anything, in any order.
///
/// Returns `true` if this call started the tasks, `false` if tracking
/// was already running.
pub fn track(refresh_interval: Duration, log_period: Duration) -> bool {
    track_with_config(
        TrackingConfig::new()
            .with_refresh_interval(refresh_interval)
            .with_log_period(log_period),
    )
}

/// Starts tracking and additionally enforces a soft ceiling on the
/// process's resident set size.
///
/// Every `limit_period` the latest snapshot's resident size is checked
/// against `max_bytes`; while above it, the allocator is pushed to
/// collect retained memory and return unused pages to the OS on every
/// check. The ceiling is advisory: nothing stops the process from
/// exceeding it between checks.
pub fn track_and_limit(
    refresh_interval: Duration,
    log_period: Duration,
    limit_period: Duration,
    max_bytes: u64,
) -> bool {
    track_with_config(
        TrackingConfig::new()
            .with_refresh_interval(refresh_interval)
            .with_log_period(log_period)
            .with_limit(limit_period, max_bytes),
    )
}

/// Starts tracking with full control over periods, sinks and sources.
///
/// Shares the one-per-process guarantee with the other entry points.
pub fn track_with_config(config: TrackingConfig) -> bool {
    if TRACKING_STARTED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return false;
    }
    spawn_tasks(config);
    true
}

fn spawn_tasks(config: TrackingConfig) {
    let store = Arc::new(SnapshotStore::new());

    let sampler = Sampler {
        store: Arc::clone(&store),
        process_info: config.process_info,
        heap_stats: config.heap_stats,
        error_sink: config.error_sink,
        interval: config.refresh_interval,
        pid: std::process::id(),
    };
    spawn_worker("memtrack-sampler", move || sampler.run());

    let logger = Logger {
        store: Arc::clone(&store),
        sink: config.sink,
        period: config.log_period,
    };
    spawn_worker("memtrack-logger", move || logger.run());

    if let Some(limit) = config.limit {
        let limiter = Limiter {
            store,
            reclaimer: config.reclaimer,
            limit,
        };
        spawn_worker("memtrack-limiter", move || limiter.run());
    }
}

fn spawn_worker<F>(name: &str, body: F)
where
    F: FnOnce() + Send + 'static,
{
    let spawned = thread::Builder::new().name(name.into()).spawn(body);
    if let Err(err) = spawned {
        log::debug!(target: "memtrack", "failed to spawn {name}: {err}");
    }
}

/// Takes a fresh snapshot on every tick and publishes it.
struct Sampler {
    store: Arc<SnapshotStore>,
    process_info: Arc<dyn ProcessInfoSource>,
    heap_stats: Arc<dyn HeapStatsSource>,
    error_sink: ErrorSink,
    interval: Duration,
    pid: u32,
}

impl Sampler {
    fn run(self) {
        loop {
            self.sample_once();
            thread::sleep(self.interval);
        }
    }

    /// One sampling tick. On a process accounting failure the previous
    /// snapshot stays current and the error sink hears about it.
    fn sample_once(&self) {
        let process = match self.process_info.memory_info(self.pid) {
            Ok(process) => process,
            Err(err) => {
                (self.error_sink)(&err);
                return;
            }
        };
        let heap = self.heap_stats.heap_stats();

        self.store.publish(MemorySnapshot {
            heap_in_use: heap.in_use,
            heap_allocated: heap.allocated,
            system_reserved: heap.reserved,
            resident_set_size: process.resident,
        });
    }
}

/// Reports the latest snapshot on its own cadence.
struct Logger {
    store: Arc<SnapshotStore>,
    sink: Arc<dyn TelemetrySink>,
    period: Duration,
}

impl Logger {
    fn run(self) {
        loop {
            thread::sleep(self.period);
            self.log_once();
        }
    }

    /// One reporting tick. Skips silently while nothing was published.
    fn log_once(&self) {
        if let Some(snapshot) = self.store.current() {
            self.sink.emit(&format_line(&snapshot));
        }
    }
}

fn format_line(snapshot: &MemorySnapshot) -> String {
    format!(
        "Memory InUse: {}    Alloc: {}    Sys: {}    RSS: {}",
        format_bytes(snapshot.heap_in_use),
        format_bytes(snapshot.heap_allocated),
        format_bytes(snapshot.system_reserved),
        format_bytes(snapshot.resident_set_size),
    )
}

/// Checks the resident size against the ceiling and pushes the
/// allocator to shed memory while it is exceeded.
struct Limiter {
    store: Arc<SnapshotStore>,
    reclaimer: Arc<dyn Reclaimer>,
    limit: MemoryLimit,
}

impl Limiter {
    fn run(self) {
        log::debug!(
            target: "memtrack",
            "will attempt to limit resident set size to {}",
            format_bytes(self.limit.max_bytes)
        );
        loop {
            thread::sleep(self.limit.period);
            self.enforce_once();
        }
    }

    /// One limit check. Fires both reclamation triggers whenever the
    /// latest resident size is above the ceiling; there is no cooldown
    /// between ticks.
    fn enforce_once(&self) {
        let Some(snapshot) = self.store.current() else {
            return;
        };
        if snapshot.resident_set_size > self.limit.max_bytes {
            log::debug!(
                target: "memtrack",
                "resident set size {} exceeds limit {}, reclaiming memory",
                format_bytes(snapshot.resident_set_size),
                format_bytes(self.limit.max_bytes)
            );
            self.reclaimer.force_collection();
            self.reclaimer.return_os_memory();
        }
    }
}
