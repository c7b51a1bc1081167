//! Event collector for broadcast assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{BroadcastEvent, ResourceKind, ResourceStatus};
use crate::port::EventEmitter;
use crate::testkit::journal::Journal;

/// Thread-safe event collector.
///
/// Clones share the same buffer, so a test can keep one clone and hand
/// another to the orchestrator.
#[derive(Clone, Default)]
pub struct RecordingEmitter {
    events: Arc<Mutex<Vec<BroadcastEvent>>>,
    journal: Option<Journal>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also record `event:<status>` in `journal` for every broadcast.
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn events(&self) -> Vec<BroadcastEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Statuses of experiment-scoped events, in broadcast order.
    pub fn statuses(&self) -> Vec<ResourceStatus> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.resource.kind == ResourceKind::Experiment)
            .map(BroadcastEvent::status)
            .collect()
    }

    /// Events about individual VMs.
    pub fn vm_events(&self) -> Vec<BroadcastEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.resource.kind == ResourceKind::ExperimentVm)
            .cloned()
            .collect()
    }

    /// `percent` values of every progress event, in order.
    pub fn progress(&self) -> Vec<f64> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.status() == ResourceStatus::Progress)
            .filter_map(BroadcastEvent::payload_json)
            .filter_map(|payload| payload["percent"].as_f64())
            .collect()
    }

    pub fn count(&self, status: ResourceStatus) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.status() == status)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventEmitter for RecordingEmitter {
    fn broadcast(&self, event: BroadcastEvent) {
        if let Some(journal) = &self.journal {
            journal.record(format!("event:{}", event.status()));
        }
        self.events.lock().push(event);
    }
}
