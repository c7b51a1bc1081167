//! Scripted [`ExperimentRuntime`].
//!
//! Behaviour is configured up front with builder methods; every call is
//! recorded in a [`Journal`] as `runtime:<op>:<name>`.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::domain::{Experiment, Vm};
use crate::error::{DelayedError, DomainError};
use crate::port::{ExperimentRuntime, StartRequest};
use crate::runtime::Notes;
use crate::testkit::journal::Journal;

#[derive(Default)]
struct Script {
    experiments: HashMap<String, (Experiment, Vec<Vm>)>,
    start_results: VecDeque<Result<(), DomainError>>,
    stop_results: VecDeque<Result<(), DomainError>>,
    notes: Vec<String>,
    delayed: Vec<DelayedError>,
    fail_snapshots: bool,
    fail_listing: bool,
    panic_on_start: bool,
    last_notes: Option<Notes>,
}

/// A runtime driven entirely by the test.
///
/// - `start` waits on the start gate (if any), then pops the next scripted
///   result (defaulting to `Ok`) and marks the experiment running.
/// - Delayed errors are sent from a task that waits for
///   [`release_delayed`](Self::release_delayed) or cancellation.
#[derive(Default)]
pub struct ScriptedRuntime {
    script: Mutex<Script>,
    start_gate: Option<Arc<Notify>>,
    delayed_gate: Arc<Notify>,
    journal: Journal,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a stopped experiment with `vms` VMs named `vm-1..`.
    pub fn with_experiment(self, name: &str, vms: usize) -> Self {
        let list = (1..=vms).map(|i| Vm::new(format!("vm-{i}"))).collect();
        self.script
            .lock()
            .experiments
            .insert(name.to_string(), (Experiment::new(name), list));
        self
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Hold every `start` until `gate` is notified.
    pub fn with_start_gate(mut self, gate: Arc<Notify>) -> Self {
        self.start_gate = Some(gate);
        self
    }

    pub fn fail_start(self, error: DomainError) -> Self {
        self.script.lock().start_results.push_back(Err(error));
        self
    }

    pub fn fail_stop(self, error: DomainError) -> Self {
        self.script.lock().stop_results.push_back(Err(error));
        self
    }

    /// Notes pushed during every start.
    pub fn with_notes(self, notes: Vec<String>) -> Self {
        self.script.lock().notes = notes;
        self
    }

    /// Errors reported after `start` returned, once released.
    pub fn with_delayed_errors(self, errors: Vec<DelayedError>) -> Self {
        self.script.lock().delayed = errors;
        self
    }

    /// Make `get_experiment` fail from now on.
    pub fn fail_snapshots(&self) {
        self.script.lock().fail_snapshots = true;
    }

    /// Make `start` panic instead of returning.
    pub fn with_panicking_start(self) -> Self {
        self.script.lock().panic_on_start = true;
        self
    }

    /// Notes buffer handed to the most recent `start`.
    ///
    /// Empty once the orchestrator has drained it.
    pub fn last_notes(&self) -> Option<Notes> {
        self.script.lock().last_notes.clone()
    }

    pub fn with_failing_listing(self) -> Self {
        self.script.lock().fail_listing = true;
        self
    }

    /// Let pending delayed errors through.
    pub fn release_delayed(&self) {
        self.delayed_gate.notify_one();
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.script
            .lock()
            .experiments
            .get(name)
            .is_some_and(|(experiment, _)| experiment.running)
    }

    fn lookup<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Script, &str) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut script = self.script.lock();
        if !script.experiments.contains_key(name) {
            return Err(DomainError::NotFound(name.to_string()));
        }
        f(&mut script, name)
    }
}

#[async_trait]
impl ExperimentRuntime for ScriptedRuntime {
    async fn start(&self, request: StartRequest) -> Result<(), DomainError> {
        let name = request.name.clone();
        self.journal.record(format!("runtime:start:{name}"));
        if let Some(gate) = &self.start_gate {
            gate.notified().await;
        }
        let panics = {
            let mut script = self.script.lock();
            script.last_notes = Some(request.notes.clone());
            script.panic_on_start
        };
        if panics {
            panic!("scripted runtime crashed while starting {name}");
        }

        let (notes, delayed) = self.lookup(&name, |script, name| {
            script.start_results.pop_front().unwrap_or(Ok(()))?;
            if let Some((experiment, vms)) = script.experiments.get_mut(name) {
                experiment.running = true;
                experiment.start_time = Some(Utc::now());
                for vm in vms {
                    vm.running = true;
                }
            }
            Ok((script.notes.clone(), std::mem::take(&mut script.delayed)))
        })?;

        for note in notes {
            request.notes.push(note);
        }

        if !delayed.is_empty() {
            let gate = Arc::clone(&self.delayed_gate);
            let cancellation = request.cancellation.clone();
            let errors = request.delayed_errors.clone();
            tokio::spawn(async move {
                tokio::select! {
                    () = gate.notified() => {}
                    () = cancellation.cancelled() => return,
                }
                for err in delayed {
                    if errors.send(err).await.is_err() {
                        return;
                    }
                }
            });
        }
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), DomainError> {
        self.journal.record(format!("runtime:stop:{name}"));
        self.lookup(name, |script, name| {
            script.stop_results.pop_front().unwrap_or(Ok(()))?;
            if let Some((experiment, vms)) = script.experiments.get_mut(name) {
                if !experiment.running {
                    return Err(DomainError::NotRunning(name.to_string()));
                }
                experiment.running = false;
                experiment.start_time = None;
                for vm in vms {
                    vm.running = false;
                }
            }
            Ok(())
        })
    }

    async fn get_experiment(&self, name: &str) -> Result<Experiment, DomainError> {
        self.lookup(name, |script, name| {
            if script.fail_snapshots {
                return Err(DomainError::Backend(format!("snapshot of {name} unavailable")));
            }
            Ok(script
                .experiments
                .get(name)
                .map(|(experiment, _)| experiment.clone())
                .unwrap_or_else(|| Experiment::new(name)))
        })
    }

    async fn list_vms(&self, name: &str) -> Result<Vec<Vm>, DomainError> {
        self.lookup(name, |script, name| {
            if script.fail_listing {
                return Err(DomainError::Backend(format!("VM listing of {name} unavailable")));
            }
            Ok(script
                .experiments
                .get(name)
                .map(|(_, vms)| vms.clone())
                .unwrap_or_default())
        })
    }

    async fn count_vms(&self, name: &str) -> Result<usize, DomainError> {
        self.lookup(name, |script, name| {
            Ok(script.experiments.get(name).map_or(0, |(_, vms)| vms.len()))
        })
    }
}
