//! labctl - Experiment lifecycle orchestration.
//!
//! This crate drives network-emulation experiments through start and stop
//! while keeping concurrent requests, background tasks and subscribers
//! consistent.
//!
//! # Architecture
//!
//! - **`application`** - The lifecycle orchestrator and the shared state it
//!   owns: per-experiment lock table, background task registry, progress
//!   reporter
//! - **`port`** - Traits for everything the orchestrator delegates:
//!   provisioning runtime, progress probe, app scheduler, event emitter,
//!   body serializer
//! - **`adapter`** - Port implementations (sandbox runtime, channel and log
//!   emitters, JSON serializer) and the CLI
//! - **`runtime`** - Cancellation, completion tracking and note buffering
//!   primitives shared with background tasks
//!
//! # Modules
//!
//! - [`domain`] - Experiments, VMs, lifecycle status and broadcast events
//! - [`error`] - Error types for the crate
//! - [`infrastructure`] - Configuration loading and runtime wiring
//! - [`testkit`] - Scripted collaborators for tests (requires `testkit` feature)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use labctl::adapter::outbound::sandbox::{Sandbox, SandboxExperiment};
//! use labctl::application::Orchestrator;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let sandbox = Arc::new(Sandbox::new(Duration::from_millis(100), Duration::from_secs(5)));
//! sandbox.define(SandboxExperiment::new("exp1", 3));
//!
//! let orchestrator = Orchestrator::builder(sandbox.clone())
//!     .probe(sandbox.clone())
//!     .scheduler(sandbox)
//!     .build();
//! let outcome = orchestrator.start("exp1").await?;
//! println!("{}", String::from_utf8_lossy(outcome.body()));
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
pub mod runtime;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
