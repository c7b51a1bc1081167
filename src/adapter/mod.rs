//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - Driving side: the command-line interface
//! - [`outbound`] - Driven side: sandbox runtime, emitters, serializer

pub mod inbound;
pub mod outbound;
