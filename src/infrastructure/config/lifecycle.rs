//! Lifecycle timing configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::LifecycleSettings;

const fn default_progress_interval_ms() -> u64 {
    2_000
}

const fn default_note_drain_interval_ms() -> u64 {
    1_000
}

const fn default_drain_timeout_secs() -> Option<u64> {
    Some(30)
}

const fn default_delayed_error_capacity() -> usize {
    32
}

/// `[lifecycle]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleConfig {
    /// Milliseconds between progress polls during a start.
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Milliseconds between drains of runtime notes into the log.
    #[serde(default = "default_note_drain_interval_ms")]
    pub note_drain_interval_ms: u64,

    /// Seconds a stop waits for background tasks before abandoning them.
    ///
    /// `0` waits indefinitely.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: Option<u64>,

    /// Buffer size of the delayed-error channel.
    #[serde(default = "default_delayed_error_capacity")]
    pub delayed_error_capacity: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: default_progress_interval_ms(),
            note_drain_interval_ms: default_note_drain_interval_ms(),
            drain_timeout_secs: default_drain_timeout_secs(),
            delayed_error_capacity: default_delayed_error_capacity(),
        }
    }
}

impl LifecycleConfig {
    #[must_use]
    pub fn to_settings(&self) -> LifecycleSettings {
        LifecycleSettings {
            progress_interval: Duration::from_millis(self.progress_interval_ms),
            note_drain_interval: Duration::from_millis(self.note_drain_interval_ms),
            drain_timeout: self
                .drain_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            delayed_error_capacity: self.delayed_error_capacity,
        }
    }
}
