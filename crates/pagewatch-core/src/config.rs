//! Probe configuration: file loading and validation.
//!
//! Two on-disk formats are accepted. TOML is the primary one:
//!
//! ```toml
//! checking_period = 30.0
//! timeout = 1.0
//! concurrency = 8
//!
//! [[targets]]
//! url = "https://example.com/"
//! content_requirement = "Example Domain"
//! ```
//!
//! The legacy JSON layout (`{"checking_period": 5, "Test_Servers": [...]}`)
//! is selected by a `.json` extension.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Target;

/// Probe timeout used when neither the file nor the target sets one.
pub const DEFAULT_TIMEOUT_SECS: f64 = 1.0;

/// Maximum in-flight probes per cycle when unset.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Upper bound accepted for `concurrency`.
pub const MAX_CONCURRENCY: usize = 65_536;

/// On-disk config format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Pick the format from the file extension; anything but `.json` is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

/// Raw file contents before validation.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    checking_period: Option<f64>,
    timeout: Option<f64>,
    concurrency: Option<usize>,
    cycle_deadline: Option<f64>,
    targets: Option<Vec<Target>>,
    #[serde(rename = "Test_Servers")]
    test_servers: Option<Vec<Target>>,
}

/// Validated, immutable probe configuration.
///
/// Loaded once before the scheduler starts and shared read-only with
/// every cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// Nominal seconds between the start of consecutive cycles.
    pub checking_period: f64,
    /// Default per-probe timeout in seconds.
    pub timeout: f64,
    /// Maximum probes in flight at once.
    pub concurrency: usize,
    /// Optional bound on a whole cycle, in seconds.
    pub cycle_deadline: Option<f64>,
    pub targets: Vec<Target>,
}

impl ProbeConfig {
    /// Build a config with default timeout and concurrency.
    pub fn new(checking_period: f64, targets: Vec<Target>) -> Self {
        Self {
            checking_period,
            timeout: DEFAULT_TIMEOUT_SECS,
            concurrency: DEFAULT_CONCURRENCY,
            cycle_deadline: None,
            targets,
        }
    }

    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_cycle_deadline(mut self, seconds: f64) -> Self {
        self.cycle_deadline = Some(seconds);
        self
    }

    /// Load and validate a config file, choosing the format by extension.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, ConfigFormat::from_path(path))
    }

    /// Parse and validate config text.
    pub fn parse(content: &str, format: ConfigFormat) -> ConfigResult<Self> {
        let file: ConfigFile = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };

        let config = Self {
            checking_period: file
                .checking_period
                .ok_or(ConfigError::MissingCheckingPeriod)?,
            timeout: file.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS),
            concurrency: file.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            cycle_deadline: file.cycle_deadline,
            targets: match (file.targets, file.test_servers) {
                (Some(_), Some(_)) => return Err(ConfigError::ConflictingTargetLists),
                (Some(targets), None) | (None, Some(targets)) => targets,
                (None, None) => Vec::new(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every invariant the scheduler relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        if !valid_seconds(self.checking_period) {
            return Err(ConfigError::InvalidCheckingPeriod(self.checking_period));
        }
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        if !valid_seconds(self.timeout) {
            return Err(ConfigError::InvalidTimeout {
                context: "all targets".to_string(),
                value: self.timeout,
            });
        }
        for (index, target) in self.targets.iter().enumerate() {
            if let Some(value) = target.timeout {
                if !valid_seconds(value) {
                    return Err(ConfigError::InvalidTimeout {
                        context: format!("target #{index} ({})", target.url),
                        value,
                    });
                }
            }
        }
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::InvalidConcurrency(self.concurrency));
        }
        if let Some(deadline) = self.cycle_deadline {
            if !valid_seconds(deadline) {
                return Err(ConfigError::InvalidCycleDeadline(deadline));
            }
        }
        Ok(())
    }

    /// The checking period as a duration.
    pub fn period(&self) -> Duration {
        seconds(self.checking_period).unwrap_or(Duration::ZERO)
    }

    /// Timeout for one probe of `target`.
    pub fn probe_timeout(&self, target: &Target) -> Duration {
        target
            .timeout
            .and_then(seconds)
            .or_else(|| seconds(self.timeout))
            .unwrap_or_else(|| Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
    }

    /// Bound on a whole cycle, if configured.
    pub fn cycle_deadline(&self) -> Option<Duration> {
        self.cycle_deadline.and_then(seconds)
    }
}

/// Strictly positive and representable as a [`Duration`].
fn valid_seconds(value: f64) -> bool {
    value > 0.0 && seconds(value).is_some()
}

fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}
