//! Experiment and VM snapshots.
//!
//! These are owned copies handed across the runtime boundary; the
//! orchestrator never holds references into the runtime's own state.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of one experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experiment {
    /// Unique experiment name.
    pub name: String,
    /// Whether the runtime reports the experiment as running.
    pub running: bool,
    /// When the most recent start completed.
    pub start_time: Option<DateTime<Utc>>,
    /// Optional scenario driving in-experiment apps.
    pub scenario: Option<String>,
}

impl Experiment {
    /// A stopped experiment with no scenario.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            running: false,
            start_time: None,
            scenario: None,
        }
    }

    #[must_use]
    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    /// Mark running as of `at`.
    #[must_use]
    pub fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.running = true;
        self.start_time = Some(at);
        self
    }
}

/// Snapshot of one VM inside an experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vm {
    pub name: String,
    pub host: Option<String>,
    pub running: bool,
    pub networks: Vec<String>,
}

impl Vm {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: None,
            running: false,
            networks: Vec::new(),
        }
    }

    #[must_use]
    pub fn on_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.networks.push(network.into());
        self
    }

    #[must_use]
    pub fn running(mut self, running: bool) -> Self {
        self.running = running;
        self
    }
}
