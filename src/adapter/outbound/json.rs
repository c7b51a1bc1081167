//! JSON response bodies.

use serde::Serialize;

use crate::domain::{Experiment, Vm};
use crate::error::SerializeError;
use crate::port::ExperimentSerializer;

/// Serializes an experiment and its VMs as one JSON document.
pub struct JsonSerializer;

#[derive(Serialize)]
struct ExperimentView<'a> {
    name: &'a str,
    running: bool,
    start_time: Option<String>,
    scenario: Option<&'a str>,
    vm_count: usize,
    vms: &'a [Vm],
}

impl ExperimentSerializer for JsonSerializer {
    fn serialize(&self, experiment: &Experiment, vms: &[Vm]) -> Result<Vec<u8>, SerializeError> {
        let view = ExperimentView {
            name: &experiment.name,
            running: experiment.running,
            start_time: experiment.start_time.map(|at| at.to_rfc3339()),
            scenario: experiment.scenario.as_deref(),
            vm_count: vms.len(),
            vms,
        };
        Ok(serde_json::to_vec(&view)?)
    }
}
