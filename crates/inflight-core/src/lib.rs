//! # inflight-core
//!
//! Bounded-concurrency admission control for workers that run many short-lived
//! asynchronous operations on behalf of user-supplied logic.
//!
//! ## Example
//! ```rust
//! use inflight_core::{AdmissionController, ControllerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let ctl = AdmissionController::new(ControllerConfig::new(2));
//!
//!     for i in 0..8u64 {
//!         ctl.admit_or_wait().await;
//!         let work = tokio::spawn(async move { i * 2 });
//!         ctl.track(Some(work), "double");
//!     }
//!
//!     ctl.drain().await;
//!     assert!(ctl.is_empty());
//! }
//! ```
mod config;
mod controller;
mod error;
mod metrics;

pub use config::{ControllerConfig, DEFAULT_MAX_PENDING, ENV_MAX_PENDING, EndReport};
pub use controller::{AdmissionController, OperationId, OperationKey, PendingOperation};
pub use error::{ConfigError, ConfigResult};
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, noop_metrics};

pub mod prelude {
    pub use crate::{AdmissionController, ControllerConfig, MetricsBackend, MetricsHandle};
}
