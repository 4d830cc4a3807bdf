use std::fmt;
use std::pin::pin;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, trace, warn};

use crate::config::{ControllerConfig, EndReport};
use crate::metrics::{MetricsHandle, emit, noop_metrics};

use super::key::{OperationId, OperationKey};
use super::pending::{PendingOperation, PendingSet};

struct Inner {
    config: ControllerConfig,
    metrics: MetricsHandle,
    pending: PendingSet,
    /// Serializes pending-size reports so the last one emitted reads the latest size.
    gauge: Mutex<()>,
}

/// Bounds the number of in-flight asynchronous operations of one worker.
///
/// Operations are registered with [`track`](Self::track) (or started with
/// [`spawn`](Self::spawn)) and leave the pending set exactly once, when their completion
/// signal fires, whatever the outcome. Producers call
/// [`admit_or_wait`](Self::admit_or_wait) before issuing more work; it suspends while the
/// pending set is larger than the configured threshold.
///
/// The controller is a cheap [`Clone`] handle: build one per worker and pass it to
/// everything that issues operations.
///
/// ```text
/// track(op, key) ──► PendingSet::insert ──► watcher task awaits op
///                                                  │
///                                                  ▼
///                     PendingGuard::drop ──► PendingSet::remove ──► Notify::notify_waiters
///                                                                          │
/// admit_or_wait() ◄── re-check len <= max_pending ◄────────────────────────┘
/// ```
#[derive(Clone)]
pub struct AdmissionController {
    inner: Arc<Inner>,
}

impl AdmissionController {
    /// Create a controller with the given config and no metrics sink.
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_metrics(config, noop_metrics())
    }

    /// Create a controller reporting to the given metrics backend.
    pub fn with_metrics(config: ControllerConfig, metrics: MetricsHandle) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                metrics,
                pending: PendingSet::new(),
                gauge: Mutex::new(()),
            }),
        }
    }

    /// Start tracking an in-flight operation.
    ///
    /// `operation` is the completion signal: any future that resolves once the underlying
    /// work has finished (a [`JoinHandle`], a `oneshot::Receiver`, ...). Its output is
    /// ignored, so success and failure are handled alike. The signal is awaited on the
    /// current Tokio runtime.
    ///
    /// Returns `None` without touching any state when `operation` is absent, or when no
    /// runtime is available to observe the signal. Never blocks, never fails.
    pub fn track<F>(
        &self,
        operation: Option<F>,
        key: impl Into<OperationKey>,
    ) -> Option<OperationId>
    where
        F: Future + Send + 'static,
    {
        let operation = operation?;
        let key = key.into();

        let Ok(runtime) = Handle::try_current() else {
            warn!(key = %key, "no tokio runtime to observe operation; not tracked");
            return None;
        };

        let guard = self.register(key);
        let id = guard.id;
        runtime.spawn(async move {
            let _guard = guard;
            let _ = operation.await;
        });
        Some(id)
    }

    /// Spawn `future` on the Tokio runtime and track it until it finishes.
    ///
    /// The operation leaves the pending set when the future returns, panics, or the
    /// returned handle is aborted. The caller keeps the handle to consume the result.
    ///
    /// # Panics
    /// Panics when called outside of a Tokio runtime, like [`tokio::spawn`].
    pub fn spawn<F>(&self, key: impl Into<OperationKey>, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let guard = self.register(key.into());
        tokio::spawn(async move {
            let _guard = guard;
            future.await
        })
    }

    /// Suspend while more operations are pending than the configured threshold.
    ///
    /// Returns immediately when the set is already within bounds. Otherwise wakes on every
    /// completion and re-checks; each wake counts as one admission wait cycle. Never
    /// returns while `pending_len() > threshold()`. Blocks for as long as tracked
    /// operations do not complete.
    pub async fn admit_or_wait(&self) {
        self.wait_until(self.inner.config.max_pending).await
    }

    /// Suspend until every tracked operation has completed.
    pub async fn drain(&self) {
        self.wait_until(0).await
    }

    /// Suspend until at most `limit` operations are pending.
    pub async fn wait_until(&self, limit: usize) {
        loop {
            let mut completed = pin!(self.inner.pending.notified());
            completed.as_mut().enable();

            let pending = self.inner.pending.len();
            if pending <= limit {
                return;
            }

            debug!(pending, limit, "admission waiting for an operation to complete");
            completed.await;
            emit(&self.inner.metrics, |m| m.record_admission_wait());
        }
    }

    /// Number of operations currently pending.
    pub fn pending_len(&self) -> usize {
        self.inner.pending.len()
    }

    /// Returns `true` if no operation is pending.
    pub fn is_empty(&self) -> bool {
        self.pending_len() == 0
    }

    /// Returns `true` if the operation with this id is still pending.
    pub fn is_pending(&self, id: OperationId) -> bool {
        self.inner.pending.contains(id)
    }

    /// Snapshot of pending operations, oldest registration first.
    pub fn pending(&self) -> Vec<PendingOperation> {
        self.inner.pending.snapshot()
    }

    /// The configured capacity threshold.
    pub fn threshold(&self) -> usize {
        self.inner.config.max_pending
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    fn register(&self, key: OperationKey) -> PendingGuard {
        let metrics = &self.inner.metrics;
        emit(metrics, |m| m.record_operation_started(key.as_str()));

        let (id, pending) = self.inner.pending.insert(key.clone());
        debug!(id = %id, key = %key, pending, "tracking operation");

        if self.inner.config.end_report == EndReport::Registration {
            emit(metrics, |m| m.record_operation_ended(key.as_str()));
        }
        self.inner.report_pending();

        PendingGuard {
            inner: Arc::clone(&self.inner),
            id,
        }
    }
}

impl Inner {
    /// Report the current pending size.
    ///
    /// The size is read under `gauge`, after the change that triggered the report, so
    /// concurrent reports cannot leave an older size as the last value seen by the sink.
    fn report_pending(&self) {
        let _serial = self.gauge.lock().unwrap_or_else(PoisonError::into_inner);
        let pending = self.pending.len();
        emit(&self.metrics, |m| m.record_pending(pending));
    }
}

impl fmt::Debug for AdmissionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionController")
            .field("config", &self.inner.config)
            .field("pending", &self.pending_len())
            .field("metrics", &"<handle>")
            .finish()
    }
}

/// Removes its operation from the pending set when dropped.
///
/// Owned by the task observing the completion signal, so removal runs exactly once:
/// on normal completion, on panic, and on abort.
struct PendingGuard {
    inner: Arc<Inner>,
    id: OperationId,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let Some((entry, pending)) = self.inner.pending.remove(self.id) else {
            return;
        };
        let elapsed = entry.started_at.elapsed();
        trace!(
            id = %self.id,
            key = %entry.key,
            pending,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "operation completed"
        );

        let metrics = &self.inner.metrics;
        if self.inner.config.end_report == EndReport::Completion {
            emit(metrics, |m| m.record_operation_ended(entry.key.as_str()));
            emit(metrics, |m| m.record_operation_duration(entry.key.as_str(), elapsed));
        }
        self.inner.report_pending();
    }
}
