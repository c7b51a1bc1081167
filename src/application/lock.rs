//! Per-experiment lock table.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{LockIntent, LockState};
use crate::error::LockError;

/// Mutual exclusion between lifecycle operations on the same experiment.
///
/// Acquisition never queues: a request for a name that is already locked
/// fails immediately, whatever the intent of the current holder.
#[derive(Debug, Default)]
pub struct LockTable {
    locks: DashMap<String, LockIntent>,
}

impl LockTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to lock `name` for `intent`.
    pub fn acquire(&self, name: &str, intent: LockIntent) -> Result<(), LockError> {
        match self.locks.entry(name.to_string()) {
            Entry::Occupied(held) => Err(LockError::Conflict {
                name: name.to_string(),
                held: *held.get(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(intent);
                Ok(())
            }
        }
    }

    /// Lock `name` for the lifetime of the returned guard.
    pub fn lock(&self, name: &str, intent: LockIntent) -> Result<LockGuard<'_>, LockError> {
        self.acquire(name, intent)?;
        Ok(LockGuard {
            table: self,
            name: name.to_string(),
        })
    }

    /// Release any lock held for `name`. Idempotent.
    pub fn release(&self, name: &str) {
        self.locks.remove(name);
    }

    /// Intent of the current holder, if any.
    #[must_use]
    pub fn held(&self, name: &str) -> Option<LockIntent> {
        self.locks.get(name).map(|held| *held)
    }

    #[must_use]
    pub fn state(&self, name: &str) -> LockState {
        LockState::from(self.held(name))
    }

    /// Number of experiments currently locked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Releases its lock when dropped, on every exit path.
#[derive(Debug)]
#[must_use = "dropping the guard releases the lock immediately"]
pub struct LockGuard<'a> {
    table: &'a LockTable,
    name: String,
}

impl LockGuard<'_> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Release the lock now.
    pub fn release(self) {}
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.table.release(&self.name);
    }
}
