use std::sync::Arc;
use std::time::Duration;

/// Backend metrics collection interface.
///
/// This trait abstracts the observability sink of the admission controller.
/// Implementations are injected via [`crate::AdmissionController::with_metrics`].
///
/// Every call is fire-and-forget: the controller never depends on a sink for correctness,
/// and a sink that panics is isolated from the caller.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record that an operation was registered for tracking.
    ///
    /// # Arguments
    /// - `key`: Operation label (observability only, may repeat)
    fn record_operation_started(&self, key: &str);
    /// Record that an operation was reported as ended.
    ///
    /// When this fires depends on [`crate::EndReport`]: at completion (default) or
    /// immediately after registration.
    ///
    /// # Arguments
    /// - `key`: Operation label
    fn record_operation_ended(&self, key: &str);
    /// Record how long an operation stayed in the pending set.
    ///
    /// Only emitted for real completions, never for registration-time end reports.
    ///
    /// # Arguments
    /// - `key`: Operation label
    /// - `elapsed`: Time between `track` and completion
    fn record_operation_duration(&self, key: &str, elapsed: Duration);
    /// Record one iteration of the admission wait loop.
    fn record_admission_wait(&self);
    /// Record the current size of the pending set.
    fn record_pending(&self, len: usize);
}

/// Shared handle to metrics backend.
///
/// Stored in the controller and shared by all completion watchers.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
