//! Diagnostic notes produced while an experiment starts.

use std::sync::Arc;

use parking_lot::Mutex;

/// Shared buffer of human-readable notes.
///
/// The runtime pushes notes while it provisions; the orchestrator drains them
/// periodically into the log.
#[derive(Debug, Clone, Default)]
pub struct Notes {
    inner: Arc<Mutex<Vec<String>>>,
}

impl Notes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, note: impl Into<String>) {
        self.inner.lock().push(note.into());
    }

    /// Take every buffered note, oldest first.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.inner.lock())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
