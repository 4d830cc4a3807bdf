use std::str::FromStr;

use anyhow::{Context, anyhow};

/// Environment variable selecting the metrics sink.
pub const ENV_METRICS: &str = "INFLIGHT_METRICS";

/// Environment variable holding the number of simulated operations.
pub const ENV_OPERATIONS: &str = "INFLIGHT_OPERATIONS";

const DEFAULT_OPERATIONS: usize = 200;

/// Where controller metrics go.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    /// Aggregate in a prometheus registry, printed on exit.
    #[default]
    Prometheus,
    /// One log line per event.
    Log,
}

impl FromStr for Sink {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prometheus" | "prom" => Ok(Sink::Prometheus),
            "log" | "tracing" => Ok(Sink::Log),
            other => Err(anyhow!("unknown metrics sink: {other} (expected prometheus|log)")),
        }
    }
}

/// Demo worker settings (the controller reads its own config).
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub sink: Sink,
    pub operations: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sink: Sink::default(),
            operations: DEFAULT_OPERATIONS,
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(sink) = lookup(ENV_METRICS) {
            cfg.sink = sink.parse::<Sink>()?;
        }
        if let Some(raw) = lookup(ENV_OPERATIONS) {
            cfg.operations = raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("invalid {ENV_OPERATIONS}: {raw:?}"))?;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let cfg = WorkerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.sink, Sink::Prometheus);
        assert_eq!(cfg.operations, DEFAULT_OPERATIONS);
    }

    #[test]
    fn reads_sink_and_operations() {
        let cfg = WorkerConfig::from_lookup(|key| match key {
            ENV_METRICS => Some("LOG".to_string()),
            ENV_OPERATIONS => Some("12".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.sink, Sink::Log);
        assert_eq!(cfg.operations, 12);
    }

    #[test]
    fn rejects_bad_values() {
        let bad_sink = WorkerConfig::from_lookup(|k| (k == ENV_METRICS).then(|| "statsd".into()));
        assert!(bad_sink.is_err());

        let bad_count = WorkerConfig::from_lookup(|k| (k == ENV_OPERATIONS).then(|| "many".into()));
        assert!(bad_count.is_err());
    }
}
