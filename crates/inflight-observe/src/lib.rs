//! Logging setup and tracing-based metrics for inflight workers.
//!
//! - [`init_logger`] installs a `tracing-subscriber` stack (text, JSON or journald).
//! - [`LogMetrics`] (feature `metrics-log`) reports controller events as log lines.
mod logger;
pub use logger::*;

mod metrics;

#[cfg(feature = "metrics-log")]
pub use metrics::LogMetrics;
