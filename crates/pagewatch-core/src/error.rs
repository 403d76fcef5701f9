//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop the scheduler before the first cycle.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("checking_period is missing")]
    MissingCheckingPeriod,

    #[error("checking_period must be a positive number of seconds, got {0}")]
    InvalidCheckingPeriod(f64),

    #[error("no targets configured")]
    NoTargets,

    #[error("timeout for {context} must be a positive number of seconds, got {value}")]
    InvalidTimeout { context: String, value: f64 },

    #[error("concurrency must be between 1 and {max}, got {0}", max = crate::config::MAX_CONCURRENCY)]
    InvalidConcurrency(usize),

    #[error("both `targets` and `Test_Servers` are set; use only one")]
    ConflictingTargetLists,

    #[error("cycle_deadline must be a positive number of seconds, got {0}")]
    InvalidCycleDeadline(f64),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
