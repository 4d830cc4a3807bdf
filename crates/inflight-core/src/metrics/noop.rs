use std::time::Duration;

use crate::metrics::backend::MetricsBackend;

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_operation_started(&self, _: &str) {}

    #[inline(always)]
    fn record_operation_ended(&self, _: &str) {}

    #[inline(always)]
    fn record_operation_duration(&self, _: &str, _: Duration) {}

    #[inline(always)]
    fn record_admission_wait(&self) {}

    #[inline(always)]
    fn record_pending(&self, _: usize) {}
}
