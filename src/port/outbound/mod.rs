//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the provisioning runtime, progress probing, app
//! scheduling, event delivery and body serialization.

pub mod emitter;
pub mod probe;
pub mod runtime;
pub mod scheduler;
pub mod serializer;
