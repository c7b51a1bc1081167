//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. The
//! configuration is loaded from a TOML file; every section is optional.
//!
//! # Example
//!
//! ```no_run
//! use labctl::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("labctl.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::broadcast::BroadcastConfig;
use super::lifecycle::LifecycleConfig;
use super::logging::LoggingConfig;
use super::sandbox::SandboxConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Lifecycle timing: progress cadence, note draining, drain timeout.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Broadcast fan-out settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Simulated experiments served by the sandbox runtime.
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Check that intervals and capacities are usable.
    fn validate(&self) -> Result<()> {
        let positive = [
            ("progress_interval_ms", self.lifecycle.progress_interval_ms),
            ("note_drain_interval_ms", self.lifecycle.note_drain_interval_ms),
            ("launch_step_ms", self.sandbox.launch_step_ms),
            ("app_interval_ms", self.sandbox.app_interval_ms),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }
        if self.lifecycle.delayed_error_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "delayed_error_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.broadcast.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "channel_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let mut names = HashSet::new();
        for experiment in &self.sandbox.experiments {
            if experiment.name.trim().is_empty() {
                return Err(ConfigError::MissingField { field: "name" }.into());
            }
            if !names.insert(experiment.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "experiments",
                    reason: format!("duplicate experiment {}", experiment.name),
                }
                .into());
            }
            if experiment.delayed_vms > experiment.vms {
                return Err(ConfigError::InvalidValue {
                    field: "delayed_vms",
                    reason: format!(
                        "experiment {} delays {} of {} VMs",
                        experiment.name, experiment.delayed_vms, experiment.vms
                    ),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
