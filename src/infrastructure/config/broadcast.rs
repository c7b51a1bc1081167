//! Broadcast configuration.

use serde::Deserialize;

const fn default_true() -> bool {
    true
}

const fn default_channel_capacity() -> usize {
    256
}

/// `[broadcast]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// Buffer size of the in-process subscriber channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Also log every broadcast via tracing.
    #[serde(default = "default_true")]
    pub log_events: bool,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            log_events: true,
        }
    }
}
