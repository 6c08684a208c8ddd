use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use memtrack::{
    CaptureSink, HeapStats, HeapStatsSource, ProcessInfoError, ProcessInfoSource, ProcessMemory,
    Reclaimer, TrackingConfig,
};

/// Reports a resident size that grows by 1 MB per call.
#[derive(Default)]
struct GrowingProcessInfo {
    calls: AtomicUsize,
}

impl ProcessInfoSource for GrowingProcessInfo {
    fn memory_info(&self, _pid: u32) -> Result<ProcessMemory, ProcessInfoError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ProcessMemory {
            resident: call as u64 * 1_000_000,
            virtual_size: 0,
        })
    }
}

struct FixedHeap;

impl HeapStatsSource for FixedHeap {
    fn heap_stats(&self) -> HeapStats {
        HeapStats {
            in_use: 2_000_000,
            allocated: 1_000_000,
            reserved: 3_000_000,
        }
    }
}

#[derive(Default)]
struct CountingReclaimer {
    collections: AtomicUsize,
    page_returns: AtomicUsize,
}

impl Reclaimer for CountingReclaimer {
    fn force_collection(&self) {
        self.collections.fetch_add(1, Ordering::SeqCst);
    }

    fn return_os_memory(&self) {
        self.page_returns.fetch_add(1, Ordering::SeqCst);
    }
}

// The startup guard is process-wide, so everything observable about the
// facade lives in this single test.
#[test]
fn test_tracking_starts_once_across_entry_points() {
    let sink = CaptureSink::new();
    let reclaimer = Arc::new(CountingReclaimer::default());
    let config = TrackingConfig::new()
        .with_refresh_interval(Duration::from_millis(10))
        .with_log_period(Duration::from_millis(20))
        .with_limit(Duration::from_millis(10), 5_000_000)
        .with_sink(sink.clone())
        .with_process_info(Arc::new(GrowingProcessInfo::default()))
        .with_heap_stats(Arc::new(FixedHeap))
        .with_reclaimer(reclaimer.clone());

    assert!(memtrack::track_with_config(config));

    // Later calls are no-ops regardless of the entry point used.
    assert!(!memtrack::track(
        Duration::from_millis(1),
        Duration::from_millis(1)
    ));
    assert!(!memtrack::track_and_limit(
        Duration::from_millis(1),
        Duration::from_millis(1),
        Duration::from_millis(1),
        1,
    ));
    assert!(!memtrack::track_with_config(TrackingConfig::new()));

    thread::sleep(Duration::from_millis(400));

    let lines = sink.fetch_and_clear();
    assert!(!lines.is_empty());

    // A single sampler feeds the reporter: the heap figures are fixed
    // and the reported resident size never moves backwards.
    let mut last_rss = 0.0_f64;
    for line in &lines {
        let rss = line
            .strip_prefix("Memory InUse: 2.0 MB    Alloc: 1.0 MB    Sys: 3.0 MB    RSS: ")
            .and_then(|rest| rest.strip_suffix(" MB"))
            .and_then(|value| value.parse::<f64>().ok())
            .unwrap_or_else(|| panic!("unexpected telemetry line: {line}"));
        assert!(rss >= last_rss, "resident size went backwards: {lines:#?}");
        last_rss = rss;
    }

    // The sampled resident size crossed the 5 MB ceiling early on, so
    // the limiter fired both triggers on its later checks.
    assert!(reclaimer.collections.load(Ordering::SeqCst) >= 1);
    assert!(reclaimer.page_returns.load(Ordering::SeqCst) >= 1);
}
