use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Environment variable holding the capacity threshold.
pub const ENV_MAX_PENDING: &str = "MAX_PENDING_OPERATIONS_PER_WORKER";

/// Capacity threshold used when nothing is configured.
pub const DEFAULT_MAX_PENDING: usize = 100;

/// When the "operation ended" metric is emitted.
///
/// - `Completion`: when the operation's completion signal fires (default).
/// - `Registration`: right after `track` registers the operation. This matches the
///   legacy plugin-server behaviour and keeps dashboards built on it unchanged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReport {
    /// Emit when the operation actually finishes.
    #[default]
    Completion,
    /// Emit immediately after registration.
    Registration,
}

impl fmt::Display for EndReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EndReport::Completion => "completion",
            EndReport::Registration => "registration",
        })
    }
}

/// Admission controller configuration.
///
/// Immutable once handed to [`crate::AdmissionController::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Capacity threshold: pending operations allowed before admission waits.
    pub max_pending: usize,
    /// Timing of the "operation ended" metric.
    pub end_report: EndReport,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_pending: DEFAULT_MAX_PENDING,
            end_report: EndReport::default(),
        }
    }
}

impl ControllerConfig {
    /// Create a config with the given threshold and default end reporting.
    pub fn new(max_pending: usize) -> Self {
        Self {
            max_pending,
            ..Default::default()
        }
    }

    /// Replace the end-report timing and return updated config.
    pub fn with_end_report(mut self, end_report: EndReport) -> Self {
        self.end_report = end_report;
        self
    }

    /// Load the config from the process environment.
    ///
    /// Reads [`ENV_MAX_PENDING`]; an unset variable keeps the default. `end_report` is set
    /// in code or through serde only.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the config through an arbitrary variable lookup.
    ///
    /// # Examples
    /// ```
    /// use inflight_core::{ControllerConfig, ENV_MAX_PENDING};
    ///
    /// let cfg =
    ///     ControllerConfig::from_lookup(|k| (k == ENV_MAX_PENDING).then(|| "8".to_string()))
    ///         .unwrap();
    /// assert_eq!(cfg.max_pending, 8);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_MAX_PENDING) {
            cfg.max_pending = parse_threshold(&raw)?;
        }
        Ok(cfg)
    }
}

fn parse_threshold(raw: &str) -> ConfigResult<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidValue {
            key: ENV_MAX_PENDING,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}
