//! Prometheus metrics backend for the inflight admission controller.
//!
//! This crate provides a [`PrometheusMetrics`] implementation of [`inflight_core::MetricsBackend`] that exposes metrics in Prometheus format.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use inflight_core::{AdmissionController, ControllerConfig};
//! use inflight_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Create prometheus metrics backend
//! let metrics = PrometheusMetrics::new()?;
//!
//! // Inject into the controller
//! let ctl = AdmissionController::with_metrics(ControllerConfig::default(), Arc::new(metrics.clone()));
//!
//! // Expose /metrics endpoint (example with custom HTTP server)
//! // let metric_families = metrics.gather();
//! // let encoder = prometheus::TextEncoder::new();
//! // encoder.encode(&metric_families, &mut response_buffer)?;
//! # let _ = ctl;
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `inflight_operations_started_total{key}` - Counter
//! - `inflight_operations_ended_total{key}` - Counter
//! - `inflight_operation_duration_seconds{key}` - Histogram
//! - `inflight_admission_waits_total` - Counter
//! - `inflight_operations_pending` - Gauge
//!
//! ## HTTP Server
//! This crate does NOT provide HTTP server for `/metrics` endpoint.
//! Use your application's existing HTTP framework (axum, warp, etc).

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
