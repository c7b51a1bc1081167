//! Start path.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::background::{drain_notes, listen_for_delayed_errors, log_notes};
use super::{LifecycleOutcome, Orchestrator};
use crate::application::progress::ProgressReporter;
use crate::domain::{Experiment, LockIntent, Operation, ResourceStatus};
use crate::error::{DomainError, LifecycleError};
use crate::port::StartRequest;
use crate::runtime::{cancellation, Cancellation, Notes};

type StartResult = Result<Experiment, DomainError>;

impl Orchestrator {
    /// Start `name` and wait for the runtime to finish provisioning.
    ///
    /// Resolves with the serialized experiment once it is running. Failures
    /// discovered after that are only broadcast, never returned.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Conflict`] if another operation holds the lock
    /// - [`LifecycleError::Domain`] if the runtime rejected the start
    /// - [`LifecycleError::Serialization`] if the body could not be built
    pub async fn start(&self, name: &str) -> Result<LifecycleOutcome, LifecycleError> {
        let _lock = match self.lock(name, LockIntent::Starting) {
            Ok(guard) => guard,
            Err(e) => {
                warn!(experiment = %name, error = %e, "Start rejected");
                return Err(e);
            }
        };

        info!(experiment = %name, "Starting experiment");
        self.announce(Operation::Start, name, ResourceStatus::Starting, None);

        let expected = match self.runtime.count_vms(name).await {
            Ok(count) => count,
            Err(e) => {
                warn!(experiment = %name, error = %e, "Counting VMs failed");
                0
            }
        };

        // Outlives the caller: only a stop cancels it.
        let (handle, context) = cancellation();
        let registration = self.tasks.register(name, handle);
        let result = self.spawn_provisioning(name, context);

        let mut reporter = ProgressReporter::new(
            name,
            expected,
            Arc::clone(&self.probe),
            Arc::clone(&self.emitter),
        );
        let result = reporter
            .run_until(self.settings.progress_interval, result)
            .await
            .unwrap_or_else(|_| {
                Err(DomainError::Backend(
                    "provisioning task exited without a result".to_string(),
                ))
            });

        match result {
            Ok(experiment) => self.finish_start(name, experiment).await,
            Err(source) => {
                error!(experiment = %name, error = %source, "Starting experiment failed");
                self.announce(Operation::Start, name, ResourceStatus::ErrorStarting, None);
                if let Some(handle) = self.tasks.unregister(name, registration) {
                    handle.cancel();
                }
                Err(LifecycleError::Domain {
                    name: name.to_string(),
                    operation: Operation::Start,
                    source,
                })
            }
        }
    }

    /// Spawn the runtime start together with its note drainer and
    /// delayed-error listener. Every task is tracked before it is spawned.
    fn spawn_provisioning(
        &self,
        name: &str,
        context: Cancellation,
    ) -> oneshot::Receiver<StartResult> {
        let (result_tx, result_rx) = oneshot::channel();
        let (error_tx, error_rx) = mpsc::channel(self.settings.delayed_error_capacity);
        let (done_tx, done_rx) = oneshot::channel();
        let notes = Notes::new();

        tokio::spawn(drain_notes(
            name.to_string(),
            notes.clone(),
            context.clone(),
            done_rx,
            self.settings.note_drain_interval,
            self.tasks.track_start(name),
        ));

        tokio::spawn(listen_for_delayed_errors(
            name.to_string(),
            error_rx,
            context.clone(),
            Arc::clone(&self.emitter),
            done_tx,
            self.tasks.track_start(name),
        ));

        let guard = self.tasks.track_start(name);
        let runtime = Arc::clone(&self.runtime);
        let request = StartRequest {
            name: name.to_string(),
            cancellation: context,
            delayed_errors: error_tx,
            notes: notes.clone(),
        };
        tokio::spawn(async move {
            let name = request.name.clone();
            let result = match runtime.start(request).await {
                Ok(()) => {
                    log_notes(&name, &notes);
                    runtime.get_experiment(&name).await
                }
                Err(e) => Err(e),
            };
            if result_tx.send(result).is_err() {
                debug!(experiment = %name, "Start caller went away before provisioning finished");
            }
            guard.done();
        });

        result_rx
    }

    async fn finish_start(
        &self,
        name: &str,
        experiment: Experiment,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        let mut warnings = Vec::new();
        if let Err(e) = self.schedule_apps(name, &experiment) {
            warnings.push(format!("unable to schedule periodic apps: {e}"));
        }

        let vms = self.list_vms(name).await;
        let body = self.serialize(Operation::Start, &experiment, &vms)?;

        self.announce(
            Operation::Start,
            name,
            ResourceStatus::Start,
            Some(body.clone()),
        );
        info!(experiment = %name, vms = vms.len(), "Experiment started");

        Ok(LifecycleOutcome::new(body).with_warnings(warnings))
    }

    /// Best effort: a scheduling failure leaves the experiment running.
    fn schedule_apps(&self, name: &str, experiment: &Experiment) -> Result<(), DomainError> {
        let (handle, context) = cancellation();
        let registration = self.tasks.register(name, handle);
        let guard = self.tasks.track_start(name);

        if let Err(e) = self.scheduler.schedule(context, guard, experiment.clone()) {
            if let Some(handle) = self.tasks.unregister(name, registration) {
                handle.cancel();
            }
            warn!(experiment = %name, error = %e, "Scheduling periodic apps failed");
            return Err(e);
        }
        Ok(())
    }
}
