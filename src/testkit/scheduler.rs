//! Test [`AppScheduler`] implementations.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::Experiment;
use crate::error::DomainError;
use crate::port::AppScheduler;
use crate::runtime::{Cancellation, TaskGuard};
use crate::testkit::journal::Journal;

/// Spawns a runner that parks until cancelled.
///
/// Records `apps:<name>:scheduled` and `apps:<name>:exited` in the journal.
#[derive(Default)]
pub struct ParkedScheduler {
    journal: Journal,
    scheduled: AtomicUsize,
}

impl ParkedScheduler {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            scheduled: AtomicUsize::new(0),
        }
    }

    pub fn scheduled(&self) -> usize {
        self.scheduled.load(Ordering::SeqCst)
    }
}

impl AppScheduler for ParkedScheduler {
    fn schedule(
        &self,
        cancellation: Cancellation,
        guard: TaskGuard,
        experiment: Experiment,
    ) -> Result<(), DomainError> {
        self.scheduled.fetch_add(1, Ordering::SeqCst);
        let journal = self.journal.clone();
        journal.record(format!("apps:{}:scheduled", experiment.name));
        tokio::spawn(async move {
            cancellation.cancelled().await;
            journal.record(format!("apps:{}:exited", experiment.name));
            guard.done();
        });
        Ok(())
    }
}

/// Always refuses to schedule.
pub struct FailingScheduler {
    error: DomainError,
}

impl FailingScheduler {
    pub fn new(error: DomainError) -> Self {
        Self { error }
    }
}

impl AppScheduler for FailingScheduler {
    fn schedule(
        &self,
        _cancellation: Cancellation,
        _guard: TaskGuard,
        _experiment: Experiment,
    ) -> Result<(), DomainError> {
        Err(self.error.clone())
    }
}
