//! Output sinks for telemetry lines.

use std::sync::{Arc, Mutex, PoisonError};

/// Receives formatted telemetry lines.
///
/// The default sink forwards lines to the [`log`] facade at debug
/// level; implement this to route telemetry elsewhere.
pub trait TelemetrySink: Send + Sync + 'static {
    /// Emits one telemetry line.
    fn emit(&self, line: &str);
}

/// Forwards telemetry lines to `log::debug!` under the `memtrack`
/// target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl LogSink {
    /// Creates the log-facade sink.
    pub fn new() -> Self {
        Self
    }
}

impl TelemetrySink for LogSink {
    fn emit(&self, line: &str) {
        log::debug!(target: "memtrack", "{line}");
    }
}

/// Collects telemetry lines instead of logging them.
///
/// Mainly useful in tests.
#[derive(Debug, Default)]
pub struct CaptureSink {
    collected: Mutex<Vec<String>>,
}

impl CaptureSink {
    /// Creates a new capturing sink, wrapped for sharing with the
    /// background tasks.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns all lines captured so far, clearing the sink.
    pub fn fetch_and_clear(&self) -> Vec<String> {
        let mut collected = self
            .collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *collected)
    }
}

impl TelemetrySink for CaptureSink {
    fn emit(&self, line: &str) {
        self.collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_sink_collects_lines() {
        let sink = CaptureSink::new();
        sink.emit("one");
        sink.emit("two");

        assert_eq!(sink.fetch_and_clear(), vec!["one", "two"]);
        assert!(sink.fetch_and_clear().is_empty());
    }
}
