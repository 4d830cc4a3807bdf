use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use inflight_core::{AdmissionController, ControllerConfig, MetricsBackend};
use tokio::sync::oneshot;
use tokio::time::timeout;

const SETTLE: Duration = Duration::from_secs(2);

fn controller(max_pending: usize) -> AdmissionController {
    AdmissionController::new(ControllerConfig::new(max_pending))
}

/// Registers an operation whose completion is driven by the returned sender.
fn pending_op(ctl: &AdmissionController, key: &str) -> oneshot::Sender<Result<(), String>> {
    let (tx, rx) = oneshot::channel();
    ctl.track(Some(rx), key).expect("operation must be tracked");
    tx
}

async fn settle(ctl: &AdmissionController, expected: usize) {
    timeout(SETTLE, async {
        while ctl.pending_len() != expected {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("pending set did not settle");
}

#[tokio::test]
async fn over_threshold_waits_for_one_completion() {
    let ctl = controller(2);
    let a = pending_op(&ctl, "a");
    let _b = pending_op(&ctl, "b");
    let _c = pending_op(&ctl, "c");
    assert_eq!(ctl.pending_len(), 3);

    let waiter = tokio::spawn({
        let ctl = ctl.clone();
        async move { ctl.admit_or_wait().await }
    });

    assert!(
        timeout(Duration::from_millis(50), async {
            while !waiter.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .is_err(),
        "admission returned while three operations were pending"
    );

    a.send(Ok(())).unwrap();
    timeout(SETTLE, waiter)
        .await
        .expect("admission must return after one completion")
        .unwrap();
    assert_eq!(ctl.pending_len(), 2);
}

#[tokio::test]
async fn empty_set_admits_immediately() {
    let ctl = controller(5);
    timeout(Duration::from_millis(10), ctl.admit_or_wait())
        .await
        .expect("empty set must not suspend");
}

#[tokio::test]
async fn within_bounds_admits_immediately() {
    let ctl = controller(2);
    let _a = pending_op(&ctl, "a");
    let _b = pending_op(&ctl, "b");

    timeout(Duration::from_millis(10), ctl.admit_or_wait())
        .await
        .expect("size equal to threshold must not suspend");
}

#[tokio::test]
async fn failed_operation_is_removed_silently() {
    let ctl = controller(10);
    let a = pending_op(&ctl, "fetch-geoip");

    a.send(Err("geoip lookup failed".to_string())).unwrap();
    settle(&ctl, 0).await;
}

#[tokio::test]
async fn dropped_signal_counts_as_completion() {
    let ctl = controller(10);
    let a = pending_op(&ctl, "fetch-geoip");

    drop(a);
    settle(&ctl, 0).await;
}

#[tokio::test]
async fn zero_threshold_waits_for_everything() {
    let ctl = controller(0);
    let a = pending_op(&ctl, "a");

    let waiter = tokio::spawn({
        let ctl = ctl.clone();
        async move { ctl.admit_or_wait().await }
    });
    tokio::task::yield_now().await;
    assert!(!waiter.is_finished());

    a.send(Ok(())).unwrap();
    timeout(SETTLE, waiter).await.unwrap().unwrap();
    assert_eq!(ctl.pending_len(), 0);
}

#[tokio::test]
async fn panicked_task_is_removed() {
    let ctl = controller(1);
    let handle = tokio::spawn(async {
        panic!("plugin blew up");
    });

    ctl.track(Some(handle), "plugin");
    settle(&ctl, 0).await;
}

#[tokio::test]
async fn pending_count_matches_unfinished_operations() {
    let ctl = controller(100);
    let mut senders: Vec<_> = (0..20)
        .map(|i| pending_op(&ctl, if i % 2 == 0 { "even" } else { "odd" }))
        .collect();
    assert_eq!(ctl.pending_len(), 20);

    for remaining in (0..20).rev() {
        senders.pop().unwrap().send(Ok(())).unwrap();
        settle(&ctl, remaining).await;
    }
}

#[tokio::test]
async fn drain_returns_once_all_complete() {
    let ctl = controller(100);
    for i in 0..10u64 {
        ctl.spawn("sleepy", async move {
            tokio::time::sleep(Duration::from_millis(i)).await;
        });
    }

    timeout(SETTLE, ctl.drain()).await.expect("drain must finish");
    assert!(ctl.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn admission_bounds_concurrency_across_threads() {
    const MAX: usize = 4;
    let ctl = controller(MAX);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    for i in 0..200u64 {
        ctl.admit_or_wait().await;
        assert!(ctl.pending_len() <= MAX);

        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        ctl.spawn("burst", async move {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_micros(100 + (i % 7) * 50)).await;
            running.fetch_sub(1, Ordering::SeqCst);
        });
    }

    timeout(Duration::from_secs(10), ctl.drain())
        .await
        .expect("drain must finish");
    assert!(ctl.is_empty());
    // Admission runs before each spawn, so at most one operation beyond the threshold.
    assert!(peak.load(Ordering::SeqCst) <= MAX + 1);
}

/// Keeps the last pending size and stalls the first report of `stall_at`.
struct StallingGauge {
    stall_at: usize,
    stalled: AtomicBool,
    last: Mutex<Option<usize>>,
}

impl StallingGauge {
    fn new(stall_at: usize) -> Self {
        Self {
            stall_at,
            stalled: AtomicBool::new(false),
            last: Mutex::new(None),
        }
    }

    fn last(&self) -> Option<usize> {
        *self.last.lock().unwrap()
    }
}

impl MetricsBackend for StallingGauge {
    fn record_operation_started(&self, _: &str) {}
    fn record_operation_ended(&self, _: &str) {}
    fn record_operation_duration(&self, _: &str, _: Duration) {}
    fn record_admission_wait(&self) {}

    fn record_pending(&self, len: usize) {
        if len == self.stall_at && !self.stalled.swap(true, Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(200));
        }
        *self.last.lock().unwrap() = Some(len);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pending_gauge_settles_on_current_size() {
    let gauge = Arc::new(StallingGauge::new(2));
    let ctl = AdmissionController::with_metrics(ControllerConfig::new(10), gauge.clone());
    let a = pending_op(&ctl, "a");

    // Register "b" on another worker; its size report stalls inside the sink.
    let register_b = tokio::spawn({
        let ctl = ctl.clone();
        async move { pending_op(&ctl, "b") }
    });
    timeout(SETTLE, async {
        while !gauge.stalled.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("size report for two pending never started");

    // "a" completes while the report for "b" is still in flight.
    a.send(Ok(())).unwrap();
    let _b = register_b.await.unwrap();
    settle(&ctl, 1).await;

    let _ = timeout(Duration::from_secs(1), async {
        while gauge.last() != Some(ctl.pending_len()) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert_eq!(gauge.last(), Some(ctl.pending_len()));
    assert_eq!(ctl.pending_len(), 1);
}
