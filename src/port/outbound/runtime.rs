//! Experiment runtime port.
//!
//! The runtime owns the experiment/VM model and the provisioning backend.
//! The orchestrator only sequences calls into it.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{Experiment, Vm};
use crate::error::{DelayedError, DomainError};
use crate::runtime::{Cancellation, Notes};

/// Everything a runtime receives when asked to start an experiment.
#[derive(Debug)]
pub struct StartRequest {
    /// Experiment to start.
    pub name: String,
    /// Context owned by the orchestrator, independent of the caller.
    ///
    /// Fires when the experiment is stopped or its start is abandoned.
    pub cancellation: Cancellation,
    /// Sink for failures discovered after `start` returned.
    ///
    /// The runtime keeps clones for any work that outlives the call; the
    /// orchestrator stops listening once every clone is dropped.
    pub delayed_errors: mpsc::Sender<DelayedError>,
    /// Diagnostic notes the orchestrator drains into its log.
    pub notes: Notes,
}

/// Start, stop and inspect experiments.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - `start` should honor `cancellation` between provisioning steps
/// - A VM that fails after `start` returned is reported as
///   [`DelayedError::Vm`] on the request's channel
#[async_trait]
pub trait ExperimentRuntime: Send + Sync {
    /// Provision and boot the experiment.
    async fn start(&self, request: StartRequest) -> Result<(), DomainError>;

    /// Tear the experiment down.
    async fn stop(&self, name: &str) -> Result<(), DomainError>;

    /// Snapshot of the experiment.
    async fn get_experiment(&self, name: &str) -> Result<Experiment, DomainError>;

    /// Snapshots of every VM in the experiment.
    async fn list_vms(&self, name: &str) -> Result<Vec<Vm>, DomainError>;

    /// Number of VMs the experiment defines.
    async fn count_vms(&self, name: &str) -> Result<usize, DomainError>;
}
