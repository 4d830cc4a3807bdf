//! Synthetic plugin workload.
//!
//! Mimics plugin callbacks that fire off short deferred operations (HTTP fetches, geoip
//! lookups, timers) without awaiting them. Every operation goes through the admission
//! controller, so the number of in-flight operations stays bounded.
use std::time::Duration;

use inflight_core::AdmissionController;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const KEYS: [&str; 3] = ["fetch", "fetch-geoip", "plugin-timer"];

/// Every n-th operation fails.
const FAIL_EVERY: usize = 7;

/// Runs up to `operations` simulated operations; returns how many were issued.
///
/// Stops issuing as soon as `token` is cancelled. Does not wait for issued operations.
pub async fn run_workload(
    ctl: &AdmissionController,
    operations: usize,
    token: &CancellationToken,
) -> usize {
    let mut issued = 0;
    for seq in 0..operations {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!(issued, "workload cancelled");
                break;
            }
            _ = ctl.admit_or_wait() => {}
        }

        let key = KEYS[seq % KEYS.len()];
        let op = tokio::spawn(simulated_operation(seq));
        ctl.track(Some(op), key);
        issued += 1;
    }
    issued
}

async fn simulated_operation(seq: usize) -> Result<(), String> {
    let delay = Duration::from_millis(((seq * 37) % 50) as u64);
    tokio::time::sleep(delay).await;

    if seq % FAIL_EVERY == FAIL_EVERY - 1 {
        debug!(seq, "simulated operation failed");
        return Err(format!("operation {seq} failed"));
    }
    Ok(())
}
