//! Sandbox runtime configuration.

use serde::Deserialize;

use crate::adapter::outbound::sandbox::SandboxExperiment;

const fn default_launch_step_ms() -> u64 {
    500
}

const fn default_app_interval_ms() -> u64 {
    5_000
}

/// One `[[sandbox.experiments]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SandboxExperimentConfig {
    pub name: String,
    pub vms: usize,
    #[serde(default)]
    pub delayed_vms: usize,
    #[serde(default)]
    pub fail_delayed: bool,
    #[serde(default)]
    pub scenario: Option<String>,
}

impl From<&SandboxExperimentConfig> for SandboxExperiment {
    fn from(config: &SandboxExperimentConfig) -> Self {
        Self {
            name: config.name.clone(),
            vms: config.vms,
            delayed: config.delayed_vms,
            fail_delayed: config.fail_delayed,
            scenario: config.scenario.clone(),
        }
    }
}

/// `[sandbox]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SandboxConfig {
    /// Milliseconds to boot one simulated VM.
    #[serde(default = "default_launch_step_ms")]
    pub launch_step_ms: u64,

    /// Milliseconds between runs of periodic apps.
    #[serde(default = "default_app_interval_ms")]
    pub app_interval_ms: u64,

    #[serde(default)]
    pub experiments: Vec<SandboxExperimentConfig>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            launch_step_ms: default_launch_step_ms(),
            app_interval_ms: default_app_interval_ms(),
            experiments: Vec::new(),
        }
    }
}
