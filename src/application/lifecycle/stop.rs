//! Stop path.

use tracing::{debug, error, info, warn};

use super::{LifecycleOutcome, Orchestrator};
use crate::application::registry::DrainOutcome;
use crate::domain::{LockIntent, Operation, ResourceStatus};
use crate::error::LifecycleError;

impl Orchestrator {
    /// Stop `name`.
    ///
    /// Every background task registered for the experiment is cancelled and
    /// awaited before the runtime is asked to tear it down, so no periodic
    /// app ever runs against a half-stopped experiment.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Conflict`] if another operation holds the lock
    /// - [`LifecycleError::Domain`] if the runtime failed to stop
    /// - [`LifecycleError::Snapshot`] if the stopped experiment could not be read
    /// - [`LifecycleError::Serialization`] if the body could not be built
    pub async fn stop(&self, name: &str) -> Result<LifecycleOutcome, LifecycleError> {
        let _lock = match self.lock(name, LockIntent::Stopping) {
            Ok(guard) => guard,
            Err(e) => {
                warn!(experiment = %name, error = %e, "Stop rejected");
                return Err(e);
            }
        };

        info!(experiment = %name, "Stopping experiment");
        self.announce(Operation::Stop, name, ResourceStatus::Stopping, None);

        let mut warnings = Vec::new();
        let cancelled = self.tasks.cancel_all(name);
        debug!(experiment = %name, tasks = cancelled, "Cancelled background tasks");

        if let DrainOutcome::Abandoned { pending } = self
            .tasks
            .await_drain(name, self.settings.drain_timeout)
            .await
        {
            warn!(
                experiment = %name,
                pending,
                "Background tasks did not exit in time, abandoning them"
            );
            warnings.push(format!(
                "abandoned {pending} background task(s) that did not exit in time"
            ));
        }
        self.tasks.clear(name);

        if let Err(source) = self.runtime.stop(name).await {
            error!(experiment = %name, error = %source, "Stopping experiment failed");
            self.announce(Operation::Stop, name, ResourceStatus::ErrorStopping, None);
            return Err(LifecycleError::Domain {
                name: name.to_string(),
                operation: Operation::Stop,
                source,
            });
        }

        let experiment = self.runtime.get_experiment(name).await.map_err(|source| {
            error!(experiment = %name, error = %source, "Reading stopped experiment failed");
            LifecycleError::Snapshot {
                name: name.to_string(),
                operation: Operation::Stop,
                source,
            }
        })?;
        let vms = self.list_vms(name).await;
        let body = self.serialize(Operation::Stop, &experiment, &vms)?;

        self.announce(
            Operation::Stop,
            name,
            ResourceStatus::Stop,
            Some(body.clone()),
        );
        info!(experiment = %name, "Experiment stopped");

        Ok(LifecycleOutcome::new(body).with_warnings(warnings))
    }
}
