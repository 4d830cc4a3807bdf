use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

use crate::logger::{
    error::LoggerResult,
    object::{LoggerFormat, LoggerLevel},
};

/// Environment variable holding the log filter expression.
pub const ENV_LOG_LEVEL: &str = "INFLIGHT_LOG";

/// Environment variable holding the log output format.
pub const ENV_LOG_FORMAT: &str = "INFLIGHT_LOG_FORMAT";

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// Log filter expression (e.g., "info", "inflight_core=debug,info").
    pub level: LoggerLevel,
    /// Whether to include module/target names in log output.
    pub with_targets: bool,
    /// Whether to use colored output (only honoured on a terminal).
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Load format and level through an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults; malformed values are rejected.
    pub fn from_lookup<F>(lookup: F) -> LoggerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            cfg.level = LoggerLevel::new(level)?;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            cfg.format = format.parse()?;
        }
        Ok(cfg)
    }

    /// Load format and level from the process environment.
    pub fn from_env() -> LoggerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Color is used only if enabled and stdout is a terminal.
    ///
    /// Evaluate at logger initialization, not at config parsing time.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LoggerError;

    #[test]
    fn default_values() {
        let config = LoggerConfig::default();

        assert_eq!(config.format, LoggerFormat::Text);
        assert_eq!(config.level.as_str(), "info");
        assert!(config.with_targets);
        assert!(config.use_color);
    }

    #[test]
    fn lookup_overrides_level_and_format() {
        let config = LoggerConfig::from_lookup(|key| match key {
            ENV_LOG_LEVEL => Some("inflight_core=trace,warn".to_string()),
            ENV_LOG_FORMAT => Some("json".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.level.as_str(), "inflight_core=trace,warn");
        assert_eq!(config.format, LoggerFormat::Json);
    }

    #[test]
    fn lookup_rejects_bad_format() {
        let res =
            LoggerConfig::from_lookup(|key| (key == ENV_LOG_FORMAT).then(|| "xml".to_string()));
        assert!(matches!(res, Err(LoggerError::InvalidFormat(_))));
    }

    #[test]
    fn serde_uses_defaults_for_missing_fields() {
        let config: LoggerConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();

        assert_eq!(config.format, LoggerFormat::Json);
        assert_eq!(config.level.as_str(), "info");
        assert!(config.with_targets);
    }
}
