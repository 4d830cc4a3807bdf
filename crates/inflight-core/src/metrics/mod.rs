//! Metrics collection abstraction for the admission controller.
//!
//! This module provides a backend interface for the controller's observability events.
//! Metrics backends (prometheus, tracing, statsd, etc) implement [`MetricsBackend`] and are injected
//! into [`crate::AdmissionController`].
mod backend;
pub use backend::{MetricsBackend, MetricsHandle};

mod noop;
pub use noop::NoOpMetrics;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::warn;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}

/// Invoke a sink call, discarding any panic raised by the backend.
pub(crate) fn emit<F>(metrics: &MetricsHandle, f: F)
where
    F: FnOnce(&dyn MetricsBackend),
{
    if catch_unwind(AssertUnwindSafe(|| f(metrics.as_ref()))).is_err() {
        warn!("metrics backend panicked; event discarded");
    }
}
