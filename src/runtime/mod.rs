//! Concurrency primitives shared by the orchestrator and its background tasks.
//!
//! - [`cancel`] - Cooperative cancellation signal built on a watch channel
//! - [`tracker`] - Completion tracker counting live background tasks
//! - [`notes`] - Diagnostic note buffer filled by the runtime during a start

pub mod cancel;
pub mod notes;
pub mod tracker;

pub use cancel::{cancellation, CancelHandle, Cancellation};
pub use notes::Notes;
pub use tracker::{CompletionTracker, TaskGuard};
