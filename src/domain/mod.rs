//! Types exchanged between the orchestrator and its collaborators.
//!
//! - [`experiment`] - Experiment and VM snapshots
//! - [`status`] - Lock intents, operations and the derived lifecycle status
//! - [`event`] - Broadcast events describing state changes

pub mod event;
pub mod experiment;
pub mod status;

pub use event::{BroadcastEvent, Resource, ResourceKind, ResourceStatus, RoutingKey};
pub use experiment::{Experiment, Vm};
pub use status::{LifecycleStatus, LockIntent, LockState, Operation};
