//! Response body port.

use crate::domain::{Experiment, Vm};
use crate::error::SerializeError;

/// Builds the wire body returned by start/stop and carried by their
/// terminal events.
pub trait ExperimentSerializer: Send + Sync {
    fn serialize(&self, experiment: &Experiment, vms: &[Vm]) -> Result<Vec<u8>, SerializeError>;
}
