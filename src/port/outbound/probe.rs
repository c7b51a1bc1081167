//! Provisioning progress port.

use async_trait::async_trait;

use crate::error::DomainError;

/// Reports how far the provisioning of an experiment has come.
#[async_trait]
pub trait LaunchProbe: Send + Sync {
    /// Fraction of `expected` VMs launched so far.
    ///
    /// Readings may be transiently lower than earlier ones; callers clamp.
    async fn launch_progress(&self, name: &str, expected: usize) -> Result<f64, DomainError>;
}

/// A probe that never reports progress.
pub struct NullProbe;

#[async_trait]
impl LaunchProbe for NullProbe {
    async fn launch_progress(&self, _name: &str, _expected: usize) -> Result<f64, DomainError> {
        Ok(0.0)
    }
}
