//! Orchestrator construction.

use std::sync::Arc;

use super::{LifecycleSettings, Orchestrator};
use crate::adapter::outbound::json::JsonSerializer;
use crate::application::lock::LockTable;
use crate::application::registry::TaskRegistry;
use crate::port::{
    AppScheduler, EventEmitter, ExperimentRuntime, ExperimentSerializer, LaunchProbe, LogEmitter,
    NoopScheduler, NullProbe,
};

/// Builder for [`Orchestrator`].
///
/// Only the runtime is required. Defaults: no progress probe, no periodic
/// apps, events logged via tracing, JSON bodies, fresh lock table and task
/// registry.
pub struct OrchestratorBuilder {
    runtime: Arc<dyn ExperimentRuntime>,
    probe: Option<Arc<dyn LaunchProbe>>,
    scheduler: Option<Arc<dyn AppScheduler>>,
    emitter: Option<Arc<dyn EventEmitter>>,
    serializer: Option<Arc<dyn ExperimentSerializer>>,
    locks: Option<Arc<LockTable>>,
    tasks: Option<Arc<TaskRegistry>>,
    settings: LifecycleSettings,
}

impl OrchestratorBuilder {
    pub fn new(runtime: Arc<dyn ExperimentRuntime>) -> Self {
        Self {
            runtime,
            probe: None,
            scheduler: None,
            emitter: None,
            serializer: None,
            locks: None,
            tasks: None,
            settings: LifecycleSettings::default(),
        }
    }

    #[must_use]
    pub fn probe(mut self, probe: Arc<dyn LaunchProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    #[must_use]
    pub fn scheduler(mut self, scheduler: Arc<dyn AppScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    #[must_use]
    pub fn emitter(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    #[must_use]
    pub fn serializer(mut self, serializer: Arc<dyn ExperimentSerializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Share a lock table with other orchestrators in the process.
    #[must_use]
    pub fn locks(mut self, locks: Arc<LockTable>) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Share a task registry with other orchestrators in the process.
    #[must_use]
    pub fn tasks(mut self, tasks: Arc<TaskRegistry>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: LifecycleSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn build(self) -> Orchestrator {
        Orchestrator {
            runtime: self.runtime,
            probe: self.probe.unwrap_or_else(|| Arc::new(NullProbe)),
            scheduler: self.scheduler.unwrap_or_else(|| Arc::new(NoopScheduler)),
            emitter: self.emitter.unwrap_or_else(|| Arc::new(LogEmitter)),
            serializer: self.serializer.unwrap_or_else(|| Arc::new(JsonSerializer)),
            locks: self.locks.unwrap_or_default(),
            tasks: self.tasks.unwrap_or_default(),
            settings: self.settings,
        }
    }
}
