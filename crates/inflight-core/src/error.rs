use thiserror::Error;

/// Errors raised while loading controller configuration.
///
/// The admission path itself is infallible; only the configuration surface can fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
