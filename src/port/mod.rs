//! Trait definitions (hexagonal ports). Depend only on domain and runtime.
//!
//! The orchestrator owns no provisioning, transport or persistence logic.
//! Everything it needs from the outside world is reached through the traits
//! below, which adapters implement.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │   Lifecycle Orchestrator │
//!                    └────────────┬────────────┘
//!        ┌──────────────┬─────────┼──────────┬──────────────┐
//!        ▼              ▼         ▼          ▼              ▼
//!   ┌─────────┐   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────────┐
//!   │ Runtime │   │  Probe  │ │Scheduler│ │ Emitter │ │ Serializer │
//!   └─────────┘   └─────────┘ └─────────┘ └─────────┘ └────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`ExperimentRuntime`] - Start, stop and inspect experiments
//! - [`LaunchProbe`] - Provisioning progress
//! - [`AppScheduler`] - Periodic in-experiment apps
//! - [`EventEmitter`] - Broadcast delivery
//! - [`ExperimentSerializer`] - Response bodies

pub mod outbound;

pub use outbound::emitter::{EmitterRegistry, EventEmitter, LogEmitter, NullEmitter};
pub use outbound::probe::{LaunchProbe, NullProbe};
pub use outbound::runtime::{ExperimentRuntime, StartRequest};
pub use outbound::scheduler::{AppScheduler, NoopScheduler};
pub use outbound::serializer::ExperimentSerializer;
