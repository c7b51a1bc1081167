//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapter::outbound::channel::ChannelEmitter;
use crate::adapter::outbound::sandbox::{Sandbox, SandboxExperiment};
use crate::application::Orchestrator;
use crate::infrastructure::config::settings::Config;
use crate::port::{EmitterRegistry, LogEmitter};

/// Build emitter registry from configuration.
///
/// The returned channel emitter is also registered, so callers can subscribe
/// to every event the orchestrator broadcasts.
pub fn build_emitter_registry(config: &Config) -> (EmitterRegistry, Arc<ChannelEmitter>) {
    let mut registry = EmitterRegistry::new();
    let channel = Arc::new(ChannelEmitter::new(config.broadcast.channel_capacity));
    registry.register(Box::new(Arc::clone(&channel)));

    if config.broadcast.log_events {
        registry.register(Box::new(LogEmitter));
    }

    (registry, channel)
}

/// Build the sandbox runtime with every configured experiment defined.
pub fn build_sandbox(config: &Config) -> Arc<Sandbox> {
    let sandbox = Sandbox::new(
        Duration::from_millis(config.sandbox.launch_step_ms),
        Duration::from_millis(config.sandbox.app_interval_ms),
    );
    for experiment in &config.sandbox.experiments {
        sandbox.define(SandboxExperiment::from(experiment));
    }
    info!(
        experiments = config.sandbox.experiments.len(),
        "Sandbox runtime ready"
    );
    Arc::new(sandbox)
}

/// Wired orchestrator plus the handles callers need next to it.
pub struct Runtime {
    pub orchestrator: Orchestrator,
    pub events: Arc<ChannelEmitter>,
    pub sandbox: Arc<Sandbox>,
}

/// Wire the orchestrator against the sandbox runtime.
pub fn build_runtime(config: &Config) -> Runtime {
    let sandbox = build_sandbox(config);
    let (registry, events) = build_emitter_registry(config);

    let orchestrator = Orchestrator::builder(sandbox.clone())
        .probe(sandbox.clone())
        .scheduler(sandbox.clone())
        .emitter(Arc::new(registry))
        .settings(config.lifecycle.to_settings())
        .build();

    Runtime {
        orchestrator,
        events,
        sandbox,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[broadcast]
log_events = false

[sandbox]
launch_step_ms = 10

[[sandbox.experiments]]
name = "exp1"
vms = 2
"#;

    #[test]
    fn test_registry_includes_log_emitter_when_enabled() {
        let config = Config::default();
        let (registry, _channel) = build_emitter_registry(&config);
        assert_eq!(registry.len(), 2);

        let config = Config::parse_toml(CONFIG).unwrap();
        let (registry, _channel) = build_emitter_registry(&config);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_runtime_cycles_configured_experiment() {
        let config = Config::parse_toml(CONFIG).unwrap();
        let runtime = build_runtime(&config);
        let mut events = runtime.events.subscribe();

        let started = runtime.orchestrator.start("exp1").await.unwrap();
        assert!(started.is_clean());
        let stopped = runtime.orchestrator.stop("exp1").await.unwrap();
        assert!(stopped.is_clean());

        let first = events.recv().await.unwrap();
        assert_eq!(first.status(), crate::domain::ResourceStatus::Starting);
        assert!(runtime.orchestrator.locks().is_empty());
    }
}
