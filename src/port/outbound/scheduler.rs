//! Periodic in-experiment app port.

use crate::domain::Experiment;
use crate::error::DomainError;
use crate::runtime::{Cancellation, TaskGuard};

/// Schedules the apps that run periodically inside a running experiment.
pub trait AppScheduler: Send + Sync {
    /// Spawn the periodic runner for `experiment`.
    ///
    /// The runner must stop once `cancellation` fires and drop `guard` as its
    /// last action. On error the guard is dropped before returning.
    fn schedule(
        &self,
        cancellation: Cancellation,
        guard: TaskGuard,
        experiment: Experiment,
    ) -> Result<(), DomainError>;
}

/// A scheduler for experiments without periodic apps.
pub struct NoopScheduler;

impl AppScheduler for NoopScheduler {
    fn schedule(
        &self,
        _cancellation: Cancellation,
        guard: TaskGuard,
        _experiment: Experiment,
    ) -> Result<(), DomainError> {
        guard.done();
        Ok(())
    }
}
