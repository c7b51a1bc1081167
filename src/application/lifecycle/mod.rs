//! Experiment lifecycle orchestration.
//!
//! The [`Orchestrator`] drives experiments through start and stop. Each
//! operation holds the experiment's lock for its whole duration, so a start
//! and a stop for the same name can never interleave.
//!
//! # Start
//!
//! ```text
//! lock(Starting) -> "starting" -> spawn provisioning, note drainer and
//! delayed-error listener -> progress ticks until the runtime answers ->
//! "errorStarting" | schedule apps + "start"{body} -> unlock
//! ```
//!
//! # Stop
//!
//! ```text
//! lock(Stopping) -> "stopping" -> cancel all tasks -> drain -> clear ->
//! runtime stop -> "errorStopping" | "stop"{body} -> unlock
//! ```

mod background;
mod builder;
mod start;
mod stop;

use std::sync::Arc;
use std::time::Duration;

use tracing::error;

pub use builder::OrchestratorBuilder;

use crate::application::lock::{LockGuard, LockTable};
use crate::application::registry::TaskRegistry;
use crate::domain::{
    BroadcastEvent, Experiment, LifecycleStatus, LockIntent, Operation, ResourceStatus, Vm,
};
use crate::error::{DomainError, LifecycleError};
use crate::port::{
    AppScheduler, EventEmitter, ExperimentRuntime, ExperimentSerializer, LaunchProbe,
};

/// Timing and sizing knobs for lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSettings {
    /// Cadence of progress polls during a start.
    pub progress_interval: Duration,
    /// Cadence at which runtime notes are drained into the log.
    pub note_drain_interval: Duration,
    /// Upper bound on waiting for background tasks during a stop.
    ///
    /// `None` waits indefinitely.
    pub drain_timeout: Option<Duration>,
    /// Buffer size of the delayed-error channel handed to the runtime.
    pub delayed_error_capacity: usize,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_secs(2),
            note_drain_interval: Duration::from_secs(1),
            drain_timeout: Some(Duration::from_secs(30)),
            delayed_error_capacity: 32,
        }
    }
}

/// Successful result of a start or stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleOutcome {
    body: Vec<u8>,
    warnings: Vec<String>,
}

impl LifecycleOutcome {
    #[must_use]
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Serialized experiment, identical to the terminal event payload.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Non-fatal problems hit after the operation itself succeeded.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Drives experiments through start and stop.
///
/// Cheap to share behind an `Arc`; all mutable state lives in the lock table
/// and the task registry, both internally synchronized.
pub struct Orchestrator {
    runtime: Arc<dyn ExperimentRuntime>,
    probe: Arc<dyn LaunchProbe>,
    scheduler: Arc<dyn AppScheduler>,
    emitter: Arc<dyn EventEmitter>,
    serializer: Arc<dyn ExperimentSerializer>,
    locks: Arc<LockTable>,
    tasks: Arc<TaskRegistry>,
    settings: LifecycleSettings,
}

impl Orchestrator {
    /// Start building an orchestrator around `runtime`.
    pub fn builder(runtime: Arc<dyn ExperimentRuntime>) -> OrchestratorBuilder {
        OrchestratorBuilder::new(runtime)
    }

    #[must_use]
    pub fn locks(&self) -> &Arc<LockTable> {
        &self.locks
    }

    #[must_use]
    pub fn tasks(&self) -> &Arc<TaskRegistry> {
        &self.tasks
    }

    #[must_use]
    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    /// Current lifecycle status of `name`.
    ///
    /// An in-flight operation wins; otherwise the runtime decides between
    /// running and stopped.
    pub async fn status(&self, name: &str) -> Result<LifecycleStatus, DomainError> {
        if let Some(intent) = self.locks.held(name) {
            return Ok(LifecycleStatus::derive(Some(intent), false));
        }
        let experiment = self.runtime.get_experiment(name).await?;
        Ok(LifecycleStatus::derive(None, experiment.running))
    }

    fn lock(&self, name: &str, intent: LockIntent) -> Result<LockGuard<'_>, LifecycleError> {
        self.locks
            .lock(name, intent)
            .map_err(|source| LifecycleError::Conflict {
                name: name.to_string(),
                intent,
                source,
            })
    }

    fn announce(
        &self,
        operation: Operation,
        name: &str,
        status: ResourceStatus,
        payload: Option<Vec<u8>>,
    ) {
        self.emitter
            .broadcast(BroadcastEvent::experiment(operation, name, status, payload));
    }

    /// VM snapshots for the response body; a listing failure is logged and
    /// yields an empty list.
    async fn list_vms(&self, name: &str) -> Vec<Vm> {
        match self.runtime.list_vms(name).await {
            Ok(vms) => vms,
            Err(e) => {
                error!(experiment = %name, error = %e, "Listing VMs failed");
                Vec::new()
            }
        }
    }

    fn serialize(
        &self,
        operation: Operation,
        experiment: &Experiment,
        vms: &[Vm],
    ) -> Result<Vec<u8>, LifecycleError> {
        self.serializer.serialize(experiment, vms).map_err(|source| {
            error!(experiment = %experiment.name, error = %source, "Serializing experiment failed");
            LifecycleError::Serialization {
                name: experiment.name.clone(),
                operation,
                source,
            }
        })
    }
}
