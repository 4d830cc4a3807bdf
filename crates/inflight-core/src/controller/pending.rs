use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::{Notify, futures::Notified};

use super::key::{OperationId, OperationKey};

/// Bookkeeping for one in-flight operation.
#[derive(Debug, Clone)]
pub(crate) struct PendingEntry {
    pub(crate) key: OperationKey,
    pub(crate) started_at: Instant,
}

/// Point-in-time view of a pending operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub id: OperationId,
    pub key: OperationKey,
    /// Time since the operation was registered.
    pub age: Duration,
}

/// Set of operations registered and not yet completed.
///
/// ### Rules
/// - Membership is by [`OperationId`], never by key.
/// - `remove` is idempotent: a second removal of the same id is a no-op.
/// - Every effective removal wakes all waiters registered on [`PendingSet::notified`].
/// - The lock is never held across an `.await`.
pub(crate) struct PendingSet {
    entries: Mutex<HashMap<OperationId, PendingEntry>>,
    completed: Notify,
    seq: AtomicU64,
}

impl PendingSet {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            completed: Notify::new(),
            seq: AtomicU64::new(1),
        }
    }

    /// Inserts a new entry and returns its id with the resulting set size.
    pub(crate) fn insert(&self, key: OperationKey) -> (OperationId, usize) {
        let id = OperationId::new(self.seq.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.lock();
        entries.insert(
            id,
            PendingEntry {
                key,
                started_at: Instant::now(),
            },
        );
        (id, entries.len())
    }

    /// Removes an entry; returns it with the remaining set size if it was present.
    pub(crate) fn remove(&self, id: OperationId) -> Option<(PendingEntry, usize)> {
        let removed = {
            let mut entries = self.lock();
            entries.remove(&id).map(|entry| (entry, entries.len()))
        };
        if removed.is_some() {
            self.completed.notify_waiters();
        }
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn contains(&self, id: OperationId) -> bool {
        self.lock().contains_key(&id)
    }

    pub(crate) fn snapshot(&self) -> Vec<PendingOperation> {
        let now = Instant::now();
        let mut ops: Vec<_> = self
            .lock()
            .iter()
            .map(|(id, entry)| PendingOperation {
                id: *id,
                key: entry.key.clone(),
                age: now.saturating_duration_since(entry.started_at),
            })
            .collect();
        ops.sort_by_key(|op| op.id);
        ops
    }

    /// Future resolving on the next removal.
    ///
    /// Callers must `enable()` it before re-checking the size, otherwise a removal
    /// between the check and the `.await` is missed.
    pub(crate) fn notified(&self) -> Notified<'_> {
        self.completed.notified()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<OperationId, PendingEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
