use std::{io::Write, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use inflight_core::{AdmissionController, ControllerConfig, MetricsHandle};
use inflight_observe::{LogMetrics, LoggerConfig, init_logger};
use inflight_prometheus::{Encoder, PrometheusMetrics, TextEncoder};

mod config;
use config::{Sink, WorkerConfig};

mod workload;
use workload::run_workload;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) logger
    init_logger(&LoggerConfig::from_env()?)?;
    info!("logger initialized");

    // 2) config
    let ctl_cfg = ControllerConfig::from_env()?;
    let worker_cfg = WorkerConfig::from_env()?;

    // 3) metrics sink
    let prometheus = PrometheusMetrics::new()?;
    let metrics: MetricsHandle = match worker_cfg.sink {
        Sink::Prometheus => Arc::new(prometheus.clone()),
        Sink::Log => Arc::new(LogMetrics),
    };

    // 4) controller, one per worker
    let ctl = AdmissionController::with_metrics(ctl_cfg, metrics);
    info!(
        threshold = ctl.threshold(),
        end_report = %ctl.config().end_report,
        sink = ?worker_cfg.sink,
        "admission controller ready"
    );

    // 5) stop issuing on ctrl-c
    let token = CancellationToken::new();
    tokio::spawn({
        let token = token.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("interrupt received; stop issuing operations"),
                Err(e) => warn!(error = %e, "failed to listen for interrupt"),
            }
            token.cancel();
        }
    });

    // 6) workload
    let issued = run_workload(&ctl, worker_cfg.operations, &token).await;
    info!(issued, pending = ctl.pending_len(), "workload finished; draining");
    ctl.drain().await;
    info!("all operations completed");

    // 7) exposition
    if worker_cfg.sink == Sink::Prometheus {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&prometheus.gather(), &mut buf)?;
        std::io::stdout().write_all(&buf)?;
    }
    Ok(())
}
