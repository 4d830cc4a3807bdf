use std::sync::Arc;
use std::time::Duration;

use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    proto::MetricFamily,
};
use tracing::trace;

use inflight_core::MetricsBackend;

const NAMESPACE: &str = "inflight";

/// Prometheus metrics backend for the admission controller.
///
/// Implements [`MetricsBackend`] and exposes prometheus metrics that can be scraped via HTTP endpoint.
///
/// ## Metrics
/// - `inflight_operations_started_total{key}` - Counter of tracked operations
/// - `inflight_operations_ended_total{key}` - Counter of ended operations
/// - `inflight_operation_duration_seconds{key}` - Histogram of time spent pending
/// - `inflight_admission_waits_total` - Counter of admission wait cycles
/// - `inflight_operations_pending` - Gauge of the pending set size
///
/// ## Label cardinality
/// `key` is the operation label chosen by the caller. Keep it to a bounded set of
/// operation kinds (e.g. "fetch", "geoip", "plugin-timer"), never per-request values.
///
/// ## Errors
/// Label lookups use the fallible prometheus API; failures are dropped, so recording never
/// panics and never reaches the controller.
#[derive(Clone)]
pub struct PrometheusMetrics {
    operations_started: IntCounterVec,
    operations_ended: IntCounterVec,
    operation_duration: HistogramVec,
    admission_waits: IntCounter,
    pending: IntGauge,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a new prometheus metrics backend with custom registry.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let operations_started = IntCounterVec::new(
            Opts::new("operations_started_total", "Total number of tracked operations")
                .namespace(NAMESPACE),
            &["key"],
        )?;
        registry.register(Box::new(operations_started.clone()))?;

        let operations_ended = IntCounterVec::new(
            Opts::new("operations_ended_total", "Total number of ended operations")
                .namespace(NAMESPACE),
            &["key"],
        )?;
        registry.register(Box::new(operations_ended.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "operation_duration_seconds",
                "Time between tracking and completion in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
            &["key"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        let admission_waits = IntCounter::with_opts(
            Opts::new("admission_waits_total", "Total admission wait cycles").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(admission_waits.clone()))?;

        let pending = IntGauge::with_opts(
            Opts::new("operations_pending", "Operations currently pending").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(pending.clone()))?;

        Ok(Self {
            operations_started,
            operations_ended,
            operation_duration,
            admission_waits,
            pending,
            registry,
        })
    }

    /// Create a new prometheus metrics backend with default registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    ///
    /// Use this to implement `/metrics` HTTP endpoint.
    ///
    /// # Example
    /// ```rust,ignore
    /// let metrics = PrometheusMetrics::new()?;
    /// let metrics_families = metrics.gather();
    /// let encoder = prometheus::TextEncoder::new();
    /// encoder.encode(&metrics_families, &mut buffer)?;
    /// ```
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Get reference to underlying prometheus registry.
    ///
    /// Useful for registering custom metrics alongside the controller metrics.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_operation_started(&self, key: &str) {
        match self.operations_started.get_metric_with_label_values(&[key]) {
            Ok(counter) => counter.inc(),
            Err(e) => trace!(key, error = %e, "started counter unavailable"),
        }
    }

    fn record_operation_ended(&self, key: &str) {
        match self.operations_ended.get_metric_with_label_values(&[key]) {
            Ok(counter) => counter.inc(),
            Err(e) => trace!(key, error = %e, "ended counter unavailable"),
        }
    }

    fn record_operation_duration(&self, key: &str, elapsed: Duration) {
        match self.operation_duration.get_metric_with_label_values(&[key]) {
            Ok(histogram) => histogram.observe(elapsed.as_secs_f64()),
            Err(e) => trace!(key, error = %e, "duration histogram unavailable"),
        }
    }

    fn record_admission_wait(&self) {
        self.admission_waits.inc();
    }

    fn record_pending(&self, len: usize) {
        self.pending.set(i64::try_from(len).unwrap_or(i64::MAX));
    }
}
