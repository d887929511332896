//! Optional profiling sink for timed codec sections.
//!
//! Purely observational: nothing in the codec depends on what a profiler
//! does with the events. Sessions default to [`NoopProfiler`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Receives timing for named codec sections.
pub trait Profiler: Send + Sync {
    /// A section finished after `elapsed`.
    fn record(&self, section: &'static str, elapsed: Duration);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProfiler;

impl Profiler for NoopProfiler {
    #[inline]
    fn record(&self, _section: &'static str, _elapsed: Duration) {}
}

/// Forwards section timings to `tracing` at trace level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProfiler;

impl Profiler for TracingProfiler {
    fn record(&self, section: &'static str, elapsed: Duration) {
        tracing::trace!(section, elapsed_us = elapsed.as_micros() as u64, "profile");
    }
}

/// Keeps every event in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingProfiler {
    events: Mutex<Vec<(&'static str, Duration)>>,
}

impl RecordingProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events in completion order.
    pub fn events(&self) -> Vec<(&'static str, Duration)> {
        self.events.lock().clone()
    }

    /// Names of recorded sections in completion order.
    pub fn sections(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|(name, _)| *name).collect()
    }

    /// Total time recorded for `section`.
    pub fn total(&self, section: &str) -> Duration {
        self.events
            .lock()
            .iter()
            .filter(|(name, _)| *name == section)
            .map(|(_, d)| *d)
            .sum()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Profiler for RecordingProfiler {
    fn record(&self, section: &'static str, elapsed: Duration) {
        self.events.lock().push((section, elapsed));
    }
}

/// RAII guard timing one section; reports on drop.
pub struct ProfileScope<'a> {
    profiler: &'a dyn Profiler,
    section: &'static str,
    start: Instant,
}

impl<'a> ProfileScope<'a> {
    pub fn new(profiler: &'a dyn Profiler, section: &'static str) -> Self {
        Self { profiler, section, start: Instant::now() }
    }
}

impl Drop for ProfileScope<'_> {
    fn drop(&mut self) {
        self.profiler.record(self.section, self.start.elapsed());
    }
}

/// Shared profiler handle used by sessions and schedulers.
pub type ProfilerHandle = Arc<dyn Profiler>;

/// The default handle: a [`NoopProfiler`].
pub fn noop_profiler() -> ProfilerHandle {
    Arc::new(NoopProfiler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_records_on_drop() {
        let profiler = RecordingProfiler::new();
        {
            let _scope = ProfileScope::new(&profiler, "outer");
            let _inner = ProfileScope::new(&profiler, "inner");
        }
        // Inner guard drops first.
        assert_eq!(profiler.sections(), vec!["inner", "outer"]);
        assert!(profiler.total("outer") >= profiler.total("inner"));
    }

    #[test]
    fn test_clear() {
        let profiler = RecordingProfiler::new();
        profiler.record("a", Duration::from_millis(1));
        profiler.record("a", Duration::from_millis(2));
        assert_eq!(profiler.total("a"), Duration::from_millis(3));
        profiler.clear();
        assert!(profiler.events().is_empty());
    }
}
