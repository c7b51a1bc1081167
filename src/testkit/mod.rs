//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`runtime`] - [`ScriptedRuntime`](runtime::ScriptedRuntime): gated starts,
//!   scripted failures and delayed errors.
//! - [`probe`] - [`ScriptedProbe`](probe::ScriptedProbe): pre-loaded progress
//!   readings with a "polled N times" signal.
//! - [`emitter`] - [`RecordingEmitter`](emitter::RecordingEmitter) for event
//!   assertions.
//! - [`scheduler`] - App schedulers that park until cancelled or fail.
//! - [`serializer`] - A serializer that always fails.
//! - [`journal`] - Ordered log shared between collaborators, for asserting
//!   the relative order of calls across tasks.

pub mod emitter;
pub mod journal;
pub mod probe;
pub mod runtime;
pub mod scheduler;
pub mod serializer;

pub use emitter::RecordingEmitter;
pub use journal::Journal;
pub use probe::ScriptedProbe;
pub use runtime::ScriptedRuntime;
pub use scheduler::{FailingScheduler, ParkedScheduler};
pub use serializer::FailingSerializer;
