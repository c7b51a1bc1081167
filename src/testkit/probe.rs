//! Scripted [`LaunchProbe`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::DomainError;
use crate::port::LaunchProbe;

/// A probe that returns pre-loaded readings in order.
///
/// Once the script is exhausted the last successful reading repeats (or
/// `0.0` if there was none).
pub struct ScriptedProbe {
    readings: Mutex<VecDeque<Result<f64, DomainError>>>,
    last: Mutex<f64>,
    polls: AtomicUsize,
    notify_after: Option<(usize, Arc<Notify>)>,
}

impl ScriptedProbe {
    pub fn new(readings: Vec<f64>) -> Self {
        Self::scripted(readings.into_iter().map(Ok).collect())
    }

    /// Readings that may include probe failures.
    pub fn scripted(readings: Vec<Result<f64, DomainError>>) -> Self {
        Self {
            readings: Mutex::new(readings.into()),
            last: Mutex::new(0.0),
            polls: AtomicUsize::new(0),
            notify_after: None,
        }
    }

    /// Signal `notify` once the probe has been polled `polls` times.
    pub fn notify_after(mut self, polls: usize, notify: Arc<Notify>) -> Self {
        self.notify_after = Some((polls, notify));
        self
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LaunchProbe for ScriptedProbe {
    async fn launch_progress(&self, _name: &str, _expected: usize) -> Result<f64, DomainError> {
        let polls = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, notify)) = &self.notify_after {
            if polls == *after {
                notify.notify_one();
            }
        }

        let next = self.readings.lock().pop_front();
        match next {
            Some(Ok(value)) => {
                *self.last.lock() = value;
                Ok(value)
            }
            Some(Err(e)) => Err(e),
            None => Ok(*self.last.lock()),
        }
    }
}
