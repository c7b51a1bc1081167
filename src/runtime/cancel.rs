//! Cooperative cancellation.
//!
//! A [`CancelHandle`] fires the signal, every [`Cancellation`] created from the
//! same pair observes it. Background tasks are expected to check the signal
//! before each unit of work and to exit promptly once it fires.

use std::sync::Arc;

use tokio::sync::watch;

/// Create a connected handle/signal pair.
#[must_use]
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, Cancellation { rx })
}

/// Fires the cancellation signal.
///
/// Dropping every clone of the handle also counts as cancellation, so a
/// context whose owner forgot it can never keep a task alive.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// True once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Observing side of a cancellation pair.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// True when the signal fired or every handle was dropped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolve once the signal fires.
    ///
    /// Cancel safe: dropping the future has no effect on the signal.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // A closed channel means every handle is gone.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_fresh_pair_is_not_cancelled() {
        let (handle, signal) = cancellation();
        assert!(!handle.is_cancelled());
        assert!(!signal.is_cancelled());
    }

    #[test]
    fn test_cancel_reaches_every_clone() {
        let (handle, signal) = cancellation();
        let other = signal.clone();

        handle.cancel();
        handle.cancel();

        assert!(handle.is_cancelled());
        assert!(signal.is_cancelled());
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_dropping_all_handles_cancels() {
        let (handle, signal) = cancellation();
        let clone = handle.clone();

        drop(handle);
        assert!(!signal.is_cancelled());

        drop(clone);
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_cancel() {
        let (handle, signal) = cancellation();

        let waiter = tokio::spawn(async move { signal.cancelled().await });
        tokio::task::yield_now().await;
        handle.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("cancellation observed")
            .expect("task joined");
    }

    #[tokio::test]
    async fn test_cancelled_resolves_immediately_when_already_fired() {
        let (handle, signal) = cancellation();
        handle.cancel();

        tokio::time::timeout(Duration::from_millis(50), signal.cancelled())
            .await
            .expect("already cancelled");
    }
}
