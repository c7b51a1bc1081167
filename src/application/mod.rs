//! Application services (use cases).
//!
//! These services own the shared lifecycle state and sequence calls into the
//! ports to implement start and stop.

pub mod lifecycle;
pub mod lock;
pub mod progress;
pub mod registry;

pub use lifecycle::{LifecycleOutcome, LifecycleSettings, Orchestrator, OrchestratorBuilder};
pub use lock::{LockGuard, LockTable};
pub use progress::ProgressReporter;
pub use registry::{DrainOutcome, RegistrationId, TaskRegistry};
