#![cfg(feature = "metrics-log")]

//! Metrics sink that writes controller events to `tracing`.
//!
//! Useful where no metrics pipeline exists: every event becomes a structured log line
//! under the `inflight::metrics` target, so it can be filtered independently
//! (e.g. `INFLIGHT_LOG=inflight::metrics=trace,info`).

use std::time::Duration;

use inflight_core::MetricsBackend;
use tracing::{debug, trace};

const TARGET: &str = "inflight::metrics";

/// [`MetricsBackend`] that logs each event instead of aggregating it.
///
/// Per-operation events go to `trace`, admission waits to `debug` since they signal
/// backpressure.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMetrics;

impl MetricsBackend for LogMetrics {
    fn record_operation_started(&self, key: &str) {
        trace!(target: TARGET, key, "operation admission started");
    }

    fn record_operation_ended(&self, key: &str) {
        trace!(target: TARGET, key, "operation admission ended");
    }

    fn record_operation_duration(&self, key: &str, elapsed: Duration) {
        trace!(
            target: TARGET,
            key,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "operation duration"
        );
    }

    fn record_admission_wait(&self) {
        debug!(target: TARGET, "admission wait cycle");
    }

    fn record_pending(&self, len: usize) {
        trace!(target: TARGET, pending = len, "pending operations");
    }
}
