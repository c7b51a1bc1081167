//! Infrastructure configuration modules.

pub mod broadcast;
pub mod lifecycle;
pub mod logging;
pub mod sandbox;
pub mod settings;

pub use settings::Config;
