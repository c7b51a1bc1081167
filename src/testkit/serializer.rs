//! Test [`ExperimentSerializer`] implementations.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::{Experiment, Vm};
use crate::error::SerializeError;
use crate::port::ExperimentSerializer;

/// Refuses to build any body.
#[derive(Default)]
pub struct FailingSerializer {
    calls: AtomicUsize,
}

impl FailingSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ExperimentSerializer for FailingSerializer {
    fn serialize(&self, experiment: &Experiment, _vms: &[Vm]) -> Result<Vec<u8>, SerializeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SerializeError::Other(format!(
            "no encoding for experiment {}",
            experiment.name
        )))
    }
}
