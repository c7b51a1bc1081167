//! Outbound adapters (driven side).

pub mod channel;
pub mod json;
pub mod sandbox;
