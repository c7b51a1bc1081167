//! Lifecycle state vocabulary.

use std::fmt;

/// Why an experiment is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockIntent {
    Starting,
    Stopping,
}

impl LockIntent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Stopping => "stopping",
        }
    }

    /// The operation holding a lock with this intent.
    #[must_use]
    pub const fn operation(self) -> Operation {
        match self {
            Self::Starting => Operation::Start,
            Self::Stopping => Operation::Stop,
        }
    }
}

impl fmt::Display for LockIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock table entry for one experiment name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    #[default]
    Free,
    LockedForStarting,
    LockedForStopping,
}

impl From<Option<LockIntent>> for LockState {
    fn from(intent: Option<LockIntent>) -> Self {
        match intent {
            None => Self::Free,
            Some(LockIntent::Starting) => Self::LockedForStarting,
            Some(LockIntent::Stopping) => Self::LockedForStopping,
        }
    }
}

/// A lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Start,
    Stop,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }

    /// Lock intent the operation acquires.
    #[must_use]
    pub const fn intent(self) -> LockIntent {
        match self {
            Self::Start => LockIntent::Starting,
            Self::Stop => LockIntent::Stopping,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conceptual lifecycle status of an experiment.
///
/// Never stored: derived from the lock table and the runtime's view of the
/// experiment, or reported transiently through terminal events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStatus {
    Stopped,
    Starting,
    Running,
    ErrorStarting,
    Stopping,
    ErrorStopping,
}

impl LifecycleStatus {
    /// Derive the status from the held lock, falling back to the runtime flag.
    #[must_use]
    pub const fn derive(lock: Option<LockIntent>, running: bool) -> Self {
        match (lock, running) {
            (Some(LockIntent::Starting), _) => Self::Starting,
            (Some(LockIntent::Stopping), _) => Self::Stopping,
            (None, true) => Self::Running,
            (None, false) => Self::Stopped,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::ErrorStarting => "errorStarting",
            Self::Stopping => "stopping",
            Self::ErrorStopping => "errorStopping",
        }
    }

    /// True while a lifecycle operation is in flight.
    #[must_use]
    pub const fn is_transitioning(self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
