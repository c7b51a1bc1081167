//! Diagnostics for `labctl` itself.
//!
//! The CLI prints experiment bodies and lifecycle events on stdout so they
//! can be piped into other tools. Everything emitted through `tracing`
//! goes to stderr instead, either as human-readable lines or as one JSON
//! object per line.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

/// `[logging]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `labctl=debug`.
    pub level: String,
    /// `json` for machine-readable stderr; anything else prints plain lines.
    pub format: String,
}

impl LoggingConfig {
    /// Whether stderr carries JSON lines.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    /// Install the global subscriber writing to stderr.
    ///
    /// Call once, before the orchestrator is built.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        if self.is_json() {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        } else {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_print_plain_info_lines() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.is_json());
    }

    #[test]
    fn test_json_format_is_case_insensitive() {
        let config: LoggingConfig = toml::from_str("format = \"JSON\"").unwrap();
        assert!(config.is_json());
        assert_eq!(config.level, "info");
    }
}
