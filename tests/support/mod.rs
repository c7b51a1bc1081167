#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use labctl::application::{Orchestrator, OrchestratorBuilder};
use labctl::runtime::{cancellation, CancelHandle, Cancellation, TaskGuard};
use labctl::testkit::{Journal, RecordingEmitter, ScriptedRuntime};

/// Orchestrator builder wired to a scripted runtime and a recording emitter.
pub fn builder(runtime: &Arc<ScriptedRuntime>, emitter: &RecordingEmitter) -> OrchestratorBuilder {
    Orchestrator::builder(runtime.clone()).emitter(Arc::new(emitter.clone()))
}

/// Yield until `check` holds, advancing paused time in small steps.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

/// A background task registered against `name` that exits only once it was
/// cancelled and then released.
pub fn spawn_parked_task(
    orchestrator: &Orchestrator,
    name: &str,
    label: &str,
    release: Cancellation,
    journal: Journal,
) {
    let (handle, signal) = cancellation();
    orchestrator.tasks().register(name, handle);
    let guard: TaskGuard = orchestrator.tasks().track_start(name);
    let label = label.to_string();
    tokio::spawn(async move {
        signal.cancelled().await;
        journal.record(format!("{label}:cancelled"));
        release.cancelled().await;
        journal.record(format!("{label}:exited"));
        guard.done();
    });
}

/// A release signal for parked tasks.
pub fn release() -> (CancelHandle, Cancellation) {
    cancellation()
}
