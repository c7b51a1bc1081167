//! Background tasks spawned while an experiment starts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::domain::BroadcastEvent;
use crate::error::DelayedError;
use crate::port::EventEmitter;
use crate::runtime::{Cancellation, Notes, TaskGuard};

/// Log every buffered note.
pub(super) fn log_notes(name: &str, notes: &Notes) {
    for note in notes.drain() {
        info!(experiment = %name, "{note}");
    }
}

/// Periodically surface runtime notes until the listener reports done or
/// the experiment is cancelled.
pub(super) async fn drain_notes(
    name: String,
    notes: Notes,
    cancellation: Cancellation,
    mut done: oneshot::Receiver<()>,
    every: Duration,
    guard: TaskGuard,
) {
    loop {
        log_notes(&name, &notes);
        tokio::select! {
            _ = &mut done => break,
            () = cancellation.cancelled() => break,
            () = tokio::time::sleep(every) => {}
        }
    }
    log_notes(&name, &notes);
    debug!(experiment = %name, "Note drainer stopped");
    guard.done();
}

/// Report delayed errors until the runtime drops its last sender or the
/// experiment is cancelled, then tell the note drainer to stop.
pub(super) async fn listen_for_delayed_errors(
    name: String,
    mut errors: mpsc::Receiver<DelayedError>,
    cancellation: Cancellation,
    emitter: Arc<dyn EventEmitter>,
    done: oneshot::Sender<()>,
    guard: TaskGuard,
) {
    loop {
        tokio::select! {
            received = errors.recv() => {
                let Some(err) = received else { break };
                report_delayed_error(&name, &err, emitter.as_ref());
            }
            () = cancellation.cancelled() => break,
        }
    }
    let _ = done.send(());
    debug!(experiment = %name, "Delayed error listener stopped");
    guard.done();
}

fn report_delayed_error(name: &str, err: &DelayedError, emitter: &dyn EventEmitter) {
    warn!(experiment = %name, error = %err, "Delayed error starting experiment");
    if let Some(vm) = err.vm() {
        emitter.broadcast(BroadcastEvent::delayed_vm_failure(name, vm));
    }
}
