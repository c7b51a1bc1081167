//! Per-experiment bookkeeping of background tasks.
//!
//! Every background task spawned on behalf of an experiment is registered
//! here with a cancellation handle and tracked by the experiment's completion
//! tracker. Stop cancels everything, waits for the tracker to drain, then
//! clears the entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::runtime::{CancelHandle, CompletionTracker, TaskGuard};

/// Identifies one registered cancellation handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

/// Result of waiting for an experiment's tasks to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every tracked task exited.
    Drained,
    /// The wait timed out with `pending` tasks still running.
    Abandoned { pending: usize },
}

#[derive(Default)]
struct TaskSet {
    handles: Vec<(RegistrationId, CancelHandle)>,
    tracker: CompletionTracker,
}

/// Process-wide task registry, safe to share between the orchestrator and
/// the tasks it spawns.
#[derive(Default)]
pub struct TaskRegistry {
    sets: Mutex<HashMap<String, TaskSet>>,
    next_id: AtomicU64,
}

impl TaskRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cancellation handle for `name`.
    pub fn register(&self, name: &str, handle: CancelHandle) -> RegistrationId {
        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.sets
            .lock()
            .entry(name.to_string())
            .or_default()
            .handles
            .push((id, handle));
        id
    }

    /// Remove one handle without firing it.
    pub fn unregister(&self, name: &str, id: RegistrationId) -> Option<CancelHandle> {
        let mut sets = self.sets.lock();
        let set = sets.get_mut(name)?;
        let index = set.handles.iter().position(|(candidate, _)| *candidate == id)?;
        Some(set.handles.remove(index).1)
    }

    /// Track a task that is about to start for `name`.
    ///
    /// The task is done when the returned guard is dropped.
    pub fn track_start(&self, name: &str) -> TaskGuard {
        self.sets
            .lock()
            .entry(name.to_string())
            .or_default()
            .tracker
            .track()
    }

    /// Fire every handle registered for `name`. Does not wait.
    ///
    /// Returns the number of handles fired.
    pub fn cancel_all(&self, name: &str) -> usize {
        let sets = self.sets.lock();
        let Some(set) = sets.get(name) else {
            return 0;
        };
        for (_, handle) in &set.handles {
            handle.cancel();
        }
        set.handles.len()
    }

    /// Wait until every task tracked for `name` exited.
    ///
    /// With a `timeout`, gives up once it elapses and reports how many tasks
    /// were still running. The map lock is not held while waiting.
    pub async fn await_drain(&self, name: &str, timeout: Option<Duration>) -> DrainOutcome {
        let Some(tracker) = self.tracker(name) else {
            return DrainOutcome::Drained;
        };

        match timeout {
            None => {
                tracker.drained().await;
                DrainOutcome::Drained
            }
            Some(limit) => match tokio::time::timeout(limit, tracker.drained()).await {
                Ok(()) => DrainOutcome::Drained,
                Err(_) => DrainOutcome::Abandoned {
                    pending: tracker.pending(),
                },
            },
        }
    }

    /// Forget `name`. Later registrations start from an empty set.
    pub fn clear(&self, name: &str) -> bool {
        let removed = self.sets.lock().remove(name);
        if let Some(set) = &removed {
            debug!(
                experiment = %name,
                handles = set.handles.len(),
                pending = set.tracker.pending(),
                "Cleared task registry entry"
            );
        }
        removed.is_some()
    }

    /// Completion tracker for `name`, if any task was ever tracked.
    #[must_use]
    pub fn tracker(&self, name: &str) -> Option<CompletionTracker> {
        self.sets.lock().get(name).map(|set| set.tracker.clone())
    }

    /// Number of registered handles for `name`.
    #[must_use]
    pub fn handle_count(&self, name: &str) -> usize {
        self.sets.lock().get(name).map_or(0, |set| set.handles.len())
    }

    /// Number of tracked tasks for `name` that have not exited.
    #[must_use]
    pub fn pending(&self, name: &str) -> usize {
        self.sets
            .lock()
            .get(name)
            .map_or(0, |set| set.tracker.pending())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.sets.lock().contains_key(name)
    }
}
