//! Configuration loading for the console.
//!
//! Configuration is loaded from a TOML file (default: `twinsync.toml`).
//! Every section and field is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use twinsync_core::{RetryPolicy, RunParams};

use crate::fetch::DEFAULT_RELAY_ENDPOINT;

/// Root configuration for the console.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Source fetch configuration.
    #[serde(default)]
    pub sync: SyncSettings,
    /// Metrics simulator configuration.
    #[serde(default)]
    pub simulator: SimulatorSettings,
}

/// Source fetch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// CORS relay prefix; the encoded target URL is appended to it.
    #[serde(default = "default_relay_endpoint")]
    pub relay_endpoint: String,
    /// Retries after the first attempt (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff before the second attempt, doubled each time (default: 1500).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

/// Metrics simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorSettings {
    /// Counter value a run starts from (default: 100000).
    #[serde(default = "default_target_count")]
    pub target_count: u64,
    /// Share of the target added per tick, in percent (default: 33).
    #[serde(default = "default_velocity_percent")]
    pub velocity_percent: u32,
    /// Seconds between ticks (default: 30).
    #[serde(default = "default_tick_secs")]
    pub tick_secs: f64,
}

// Default value functions
fn default_relay_endpoint() -> String {
    DEFAULT_RELAY_ENDPOINT.to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1500
}

fn default_target_count() -> u64 {
    100_000
}

fn default_velocity_percent() -> u32 {
    33
}

fn default_tick_secs() -> f64 {
    30.0
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            relay_endpoint: default_relay_endpoint(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            target_count: default_target_count(),
            velocity_percent: default_velocity_percent(),
            tick_secs: default_tick_secs(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tick = self.simulator.tick_secs;
        let representable = Duration::try_from_secs_f64(tick).is_ok_and(|d| !d.is_zero());
        if tick <= 0.0 || !representable {
            return Err(ConfigError::Invalid(format!(
                "simulator.tick_secs must be a positive number of seconds, got {}",
                tick
            )));
        }
        if self.sync.relay_endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "sync.relay_endpoint must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Retry policy for both fetch units.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.sync.max_retries,
            Duration::from_millis(self.sync.base_delay_ms),
        )
    }

    /// Parameters for a simulated run.
    pub fn run_params(&self) -> RunParams {
        RunParams {
            target_count: self.simulator.target_count,
            velocity_percent: self.simulator.velocity_percent,
        }
    }

    /// Simulator tick period.
    ///
    /// Call [`ConsoleConfig::validate`] first; a value it rejects yields a
    /// zero period.
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.simulator.tick_secs).unwrap_or(Duration::ZERO)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
