use thiserror::Error;

use crate::domain::{LockIntent, Operation};

/// Lock table errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    #[error("experiment {name} is already locked for {held}")]
    Conflict { name: String, held: LockIntent },
}

/// Errors reported by the experiment runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("experiment {0} not found")]
    NotFound(String),

    #[error("experiment {0} is already running")]
    AlreadyRunning(String),

    #[error("experiment {0} is not running")]
    NotRunning(String),

    #[error("{0}")]
    Backend(String),
}

/// Failures surfaced after a start already reported success.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelayedError {
    #[error("VM {vm} failed to start: {reason}")]
    Vm { vm: String, reason: String },

    #[error("{0}")]
    Other(String),
}

impl DelayedError {
    /// The VM this error concerns, if it is a VM failure.
    #[must_use]
    pub fn vm(&self) -> Option<&str> {
        match self {
            Self::Vm { vm, .. } => Some(vm),
            Self::Other(_) => None,
        }
    }
}

/// Errors building a response body.
#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Transport-independent classification of a lifecycle failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The experiment is locked by another operation.
    Conflict,
    /// The runtime rejected the operation.
    BadRequest,
    /// The operation went through but no response could be built.
    Internal,
}

impl ErrorClass {
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Conflict => 409,
            Self::BadRequest => 400,
            Self::Internal => 500,
        }
    }
}

/// Errors returned by start and stop.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("unable to lock experiment {name} for {intent}")]
    Conflict {
        name: String,
        intent: LockIntent,
        #[source]
        source: LockError,
    },

    #[error("unable to {operation} experiment {name}")]
    Domain {
        name: String,
        operation: Operation,
        #[source]
        source: DomainError,
    },

    #[error("unable to read experiment {name} after {operation}")]
    Snapshot {
        name: String,
        operation: Operation,
        #[source]
        source: DomainError,
    },

    #[error("unable to {operation} experiment {name}")]
    Serialization {
        name: String,
        operation: Operation,
        #[source]
        source: SerializeError,
    },
}

impl LifecycleError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Conflict { .. } => ErrorClass::Conflict,
            Self::Domain { .. } => ErrorClass::BadRequest,
            Self::Snapshot { .. } | Self::Serialization { .. } => ErrorClass::Internal,
        }
    }

    #[must_use]
    pub fn http_status(&self) -> u16 {
        self.class().http_status()
    }

    /// Experiment the failed operation targeted.
    #[must_use]
    pub fn experiment(&self) -> &str {
        match self {
            Self::Conflict { name, .. }
            | Self::Domain { name, .. }
            | Self::Snapshot { name, .. }
            | Self::Serialization { name, .. } => name,
        }
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Conflict { intent, .. } => intent.operation(),
            Self::Domain { operation, .. }
            | Self::Snapshot { operation, .. }
            | Self::Serialization { operation, .. } => *operation,
        }
    }
}

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
