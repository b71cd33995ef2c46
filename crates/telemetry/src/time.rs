// Path: crates/telemetry/src/time.rs
use crate::sinks::LedgerMetricsSink;
use std::time::Instant;

/// Observes the duration of one node call when dropped.
pub struct Timer<'a> {
    sink: &'a dyn LedgerMetricsSink,
    method: &'static str,
    start: Instant,
}

impl<'a> Timer<'a> {
    /// Starts timing a call to `method`.
    pub fn new(sink: &'a dyn LedgerMetricsSink, method: &'static str) -> Self {
        Self {
            sink,
            method,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        self.sink
            .observe_node_call_duration(self.method, self.start.elapsed().as_secs_f64());
    }
}
