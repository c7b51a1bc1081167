//! Completion tracking for background tasks.
//!
//! The tracker is a counter that reaches zero only when every task that was
//! tracked has dropped its [`TaskGuard`]. Waiters suspend on the underlying
//! watch channel instead of polling.

use std::sync::Arc;

use tokio::sync::watch;

/// Counts live background tasks for one experiment.
#[derive(Debug, Clone)]
pub struct CompletionTracker {
    count: Arc<watch::Sender<usize>>,
}

impl CompletionTracker {
    /// Create a tracker with no live tasks.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            count: Arc::new(tx),
        }
    }

    /// Record a task about to begin work.
    ///
    /// Call this before spawning the task; the returned guard must move into
    /// the task and be dropped as its last action.
    pub fn track(&self) -> TaskGuard {
        self.count.send_modify(|count| *count += 1);
        TaskGuard {
            count: Arc::clone(&self.count),
        }
    }

    /// Number of tracked tasks that have not exited yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolve once no tracked task is left.
    pub async fn drained(&self) {
        let mut rx = self.count.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|count| *count == 0).await;
    }
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof that a tracked task is still running.
///
/// Dropping the guard marks the task as done, including when the task panics
/// or its future is dropped.
#[derive(Debug)]
#[must_use = "dropping the guard immediately marks the task as done"]
pub struct TaskGuard {
    count: Arc<watch::Sender<usize>>,
}

impl TaskGuard {
    /// Mark the task as done.
    pub fn done(self) {}
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.count.send_modify(|count| *count = count.saturating_sub(1));
    }
}
