//! In-memory experiment runtime.
//!
//! Simulates provisioning by booting one VM per `launch_step`, optionally
//! leaving some VMs to boot after the start returned. Used by the `labctl`
//! binary to exercise the orchestrator without a real VM backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::{Experiment, Vm};
use crate::error::{DelayedError, DomainError};
use crate::port::{AppScheduler, ExperimentRuntime, LaunchProbe, StartRequest};
use crate::runtime::{Cancellation, TaskGuard};

/// Definition of one simulated experiment.
#[derive(Debug, Clone)]
pub struct SandboxExperiment {
    pub name: String,
    pub vms: usize,
    /// How many of the VMs boot only after the start returned.
    pub delayed: usize,
    /// Whether delayed VMs fail instead of booting.
    pub fail_delayed: bool,
    pub scenario: Option<String>,
}

impl SandboxExperiment {
    #[must_use]
    pub fn new(name: impl Into<String>, vms: usize) -> Self {
        Self {
            name: name.into(),
            vms,
            delayed: 0,
            fail_delayed: false,
            scenario: None,
        }
    }
}

struct Record {
    experiment: Experiment,
    vms: Vec<Vm>,
    delayed: usize,
    fail_delayed: bool,
    launched: usize,
    app_runs: u64,
}

type Records = Arc<Mutex<HashMap<String, Record>>>;

/// Simulated runtime, probe and app scheduler in one.
pub struct Sandbox {
    records: Records,
    launch_step: Duration,
    app_interval: Duration,
}

impl Sandbox {
    #[must_use]
    pub fn new(launch_step: Duration, app_interval: Duration) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            launch_step,
            app_interval,
        }
    }

    /// Define an experiment. Replaces any previous definition with that name.
    pub fn define(&self, definition: SandboxExperiment) {
        let vms = (1..=definition.vms)
            .map(|i| {
                Vm::new(format!("vm-{i}"))
                    .on_host("sandbox")
                    .with_network(format!("{}_net", definition.name))
            })
            .collect();
        let mut experiment = Experiment::new(&definition.name);
        experiment.scenario = definition.scenario;

        self.records.lock().insert(
            definition.name,
            Record {
                experiment,
                vms,
                delayed: definition.delayed.min(definition.vms),
                fail_delayed: definition.fail_delayed,
                launched: 0,
                app_runs: 0,
            },
        );
    }

    /// How many times the periodic apps ran for `name`.
    #[must_use]
    pub fn app_runs(&self, name: &str) -> u64 {
        self.records.lock().get(name).map_or(0, |r| r.app_runs)
    }

    fn with_record<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Record) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut records = self.records.lock();
        let record = records
            .get_mut(name)
            .ok_or_else(|| DomainError::NotFound(name.to_string()))?;
        f(record)
    }
}

fn boot(records: &Records, name: &str, index: usize) -> Option<String> {
    let mut records = records.lock();
    let record = records.get_mut(name)?;
    let vm = record.vms.get_mut(index)?;
    vm.running = true;
    record.launched += 1;
    Some(vm.name.clone())
}

async fn boot_delayed(
    records: Records,
    name: String,
    range: std::ops::Range<usize>,
    fail: bool,
    step: Duration,
    cancellation: Cancellation,
    errors: mpsc::Sender<DelayedError>,
) {
    for index in range {
        tokio::select! {
            biased;
            () = cancellation.cancelled() => return,
            () = tokio::time::sleep(step) => {}
        }
        // A stop may land while the timer fires.
        if cancellation.is_cancelled() {
            return;
        }
        if fail {
            let vm = format!("vm-{}", index + 1);
            let err = DelayedError::Vm {
                vm,
                reason: "sandbox boot failure".to_string(),
            };
            if errors.send(err).await.is_err() {
                return;
            }
        } else if let Some(vm) = boot(&records, &name, index) {
            debug!(experiment = %name, vm = %vm, "Delayed VM booted");
        }
    }
}

#[async_trait]
impl ExperimentRuntime for Sandbox {
    async fn start(&self, request: StartRequest) -> Result<(), DomainError> {
        let name = request.name.clone();
        let (total, delayed, fail_delayed) = self.with_record(&name, |record| {
            if record.experiment.running {
                return Err(DomainError::AlreadyRunning(name.clone()));
            }
            record.launched = 0;
            for vm in &mut record.vms {
                vm.running = false;
            }
            Ok((record.vms.len(), record.delayed, record.fail_delayed))
        })?;

        let immediate = total - delayed;
        request
            .notes
            .push(format!("provisioning {total} VMs ({delayed} delayed)"));

        for index in 0..immediate {
            tokio::select! {
                () = request.cancellation.cancelled() => {
                    return Err(DomainError::Backend(format!("start of {name} cancelled")));
                }
                () = tokio::time::sleep(self.launch_step) => {}
            }
            if let Some(vm) = boot(&self.records, &name, index) {
                request.notes.push(format!("booted {vm}"));
            }
        }

        self.with_record(&name, |record| {
            record.experiment.running = true;
            record.experiment.start_time = Some(Utc::now());
            Ok(())
        })?;

        if delayed > 0 {
            tokio::spawn(boot_delayed(
                Arc::clone(&self.records),
                name,
                immediate..total,
                fail_delayed,
                self.launch_step,
                request.cancellation.clone(),
                request.delayed_errors.clone(),
            ));
        }
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), DomainError> {
        self.with_record(name, |record| {
            if !record.experiment.running {
                return Err(DomainError::NotRunning(name.to_string()));
            }
            record.experiment.running = false;
            record.experiment.start_time = None;
            record.launched = 0;
            for vm in &mut record.vms {
                vm.running = false;
            }
            Ok(())
        })
    }

    async fn get_experiment(&self, name: &str) -> Result<Experiment, DomainError> {
        self.with_record(name, |record| Ok(record.experiment.clone()))
    }

    async fn list_vms(&self, name: &str) -> Result<Vec<Vm>, DomainError> {
        self.with_record(name, |record| Ok(record.vms.clone()))
    }

    async fn count_vms(&self, name: &str) -> Result<usize, DomainError> {
        self.with_record(name, |record| Ok(record.vms.len()))
    }
}

#[async_trait]
impl LaunchProbe for Sandbox {
    async fn launch_progress(&self, name: &str, expected: usize) -> Result<f64, DomainError> {
        let launched = self.with_record(name, |record| Ok(record.launched))?;
        Ok(launched as f64 / expected.max(1) as f64)
    }
}

impl AppScheduler for Sandbox {
    fn schedule(
        &self,
        cancellation: Cancellation,
        guard: TaskGuard,
        experiment: Experiment,
    ) -> Result<(), DomainError> {
        let name = experiment.name;
        self.with_record(&name, |_| Ok(()))?;

        let records = Arc::clone(&self.records);
        let every = self.app_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                tokio::select! {
                    () = cancellation.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Some(record) = records.lock().get_mut(&name) {
                            record.app_runs += 1;
                        }
                        debug!(experiment = %name, "Ran periodic apps");
                    }
                }
            }
            guard.done();
        });
        Ok(())
    }
}
