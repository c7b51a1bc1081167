mod support;

use std::sync::Arc;

use labctl::domain::{LockIntent, LockState, ResourceKind, ResourceStatus};
use labctl::error::{DelayedError, DomainError, ErrorClass, LifecycleError};
use labctl::testkit::{
    FailingScheduler, FailingSerializer, RecordingEmitter, ScriptedProbe, ScriptedRuntime,
};
use serde_json::Value;
use tokio::sync::Notify;

use support::{builder, eventually};

#[tokio::test(start_paused = true)]
async fn start_reports_two_progress_polls_then_body() {
    let gate = Arc::new(Notify::new());
    let runtime = Arc::new(
        ScriptedRuntime::new()
            .with_experiment("exp1", 3)
            .with_start_gate(gate.clone()),
    );
    let probe = Arc::new(ScriptedProbe::new(vec![0.3, 0.7]).notify_after(2, gate));
    let emitter = RecordingEmitter::new();
    let orchestrator = builder(&runtime, &emitter).probe(probe.clone()).build();

    let outcome = orchestrator.start("exp1").await.unwrap();

    assert_eq!(
        emitter.statuses(),
        vec![
            ResourceStatus::Starting,
            ResourceStatus::Progress,
            ResourceStatus::Progress,
            ResourceStatus::Start,
        ]
    );
    assert_eq!(emitter.progress(), vec![0.3, 0.7]);
    assert_eq!(probe.polls(), 2);

    let body: Value = serde_json::from_slice(outcome.body()).unwrap();
    assert_eq!(body["name"], "exp1");
    assert_eq!(body["running"], true);
    assert_eq!(body["vms"].as_array().map(Vec::len), Some(3));

    let events = emitter.events();
    let terminal = events.last().unwrap();
    assert_eq!(terminal.payload.as_deref(), Some(outcome.body()));
    assert_eq!(terminal.routing_key.resource, "experiments/start");
    assert_eq!(terminal.routing_key.verb, "update");
    assert!(outcome.is_clean());
    assert_eq!(orchestrator.locks().state("exp1"), LockState::Free);
}

#[tokio::test(start_paused = true)]
async fn concurrent_start_is_rejected_with_conflict() {
    let gate = Arc::new(Notify::new());
    let runtime = Arc::new(
        ScriptedRuntime::new()
            .with_experiment("exp1", 1)
            .with_start_gate(gate.clone()),
    );
    let emitter = RecordingEmitter::new();
    let orchestrator = Arc::new(builder(&runtime, &emitter).build());

    let first = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.start("exp1").await }
    });
    eventually(|| orchestrator.locks().held("exp1").is_some()).await;

    let err = orchestrator.start("exp1").await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Conflict);
    assert_eq!(err.http_status(), 409);
    assert!(matches!(
        err,
        LifecycleError::Conflict {
            intent: LockIntent::Starting,
            ..
        }
    ));
    assert_eq!(orchestrator.locks().state("exp1"), LockState::LockedForStarting);

    gate.notify_one();
    first.await.unwrap().unwrap();

    assert_eq!(emitter.count(ResourceStatus::Starting), 1);
    assert_eq!(emitter.count(ResourceStatus::Start), 1);
    assert_eq!(runtime.journal().count("runtime:start:exp1"), 1);
}

#[tokio::test(start_paused = true)]
async fn runtime_failure_reports_error_starting() {
    let runtime = Arc::new(
        ScriptedRuntime::new()
            .with_experiment("exp1", 2)
            .fail_start(DomainError::Backend("no hosts available".into())),
    );
    let emitter = RecordingEmitter::new();
    let orchestrator = builder(&runtime, &emitter).build();

    let err = orchestrator.start("exp1").await.unwrap_err();

    assert_eq!(err.http_status(), 400);
    assert_eq!(err.experiment(), "exp1");
    assert!(matches!(
        err,
        LifecycleError::Domain {
            source: DomainError::Backend(_),
            ..
        }
    ));

    let statuses = emitter.statuses();
    assert_eq!(statuses.first(), Some(&ResourceStatus::Starting));
    assert_eq!(statuses.last(), Some(&ResourceStatus::ErrorStarting));
    assert_eq!(emitter.count(ResourceStatus::Start), 0);
    assert!(emitter.events().last().unwrap().payload.is_none());

    assert_eq!(orchestrator.locks().state("exp1"), LockState::Free);
    assert_eq!(orchestrator.tasks().handle_count("exp1"), 0);
    eventually(|| orchestrator.tasks().pending("exp1") == 0).await;
    assert!(!runtime.is_running("exp1"));
}

#[tokio::test(start_paused = true)]
async fn unknown_experiment_fails_as_bad_request() {
    let runtime = Arc::new(ScriptedRuntime::new());
    let emitter = RecordingEmitter::new();
    let orchestrator = builder(&runtime, &emitter).build();

    let err = orchestrator.start("ghost").await.unwrap_err();

    assert_eq!(err.class(), ErrorClass::BadRequest);
    assert_eq!(emitter.statuses().last(), Some(&ResourceStatus::ErrorStarting));
    assert!(orchestrator.locks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn delayed_vm_failure_is_broadcast_once_after_start() {
    let runtime = Arc::new(
        ScriptedRuntime::new()
            .with_experiment("exp1", 3)
            .with_delayed_errors(vec![
                DelayedError::Vm {
                    vm: "vm-2".into(),
                    reason: "boot timeout".into(),
                },
                DelayedError::Other("console unavailable".into()),
            ]),
    );
    let emitter = RecordingEmitter::new();
    let orchestrator = builder(&runtime, &emitter).build();

    let outcome = orchestrator.start("exp1").await.unwrap();
    assert!(outcome.is_clean());
    assert!(emitter.vm_events().is_empty());

    runtime.release_delayed();
    eventually(|| orchestrator.tasks().pending("exp1") == 0).await;

    let vm_events = emitter.vm_events();
    assert_eq!(vm_events.len(), 1);
    let event = &vm_events[0];
    assert_eq!(event.resource.kind, ResourceKind::ExperimentVm);
    assert_eq!(event.resource.id, "exp1/vm-2");
    assert_eq!(event.status(), ResourceStatus::Error);
    assert_eq!(event.routing_key.resource, "experiments/start");
    assert_eq!(
        event.payload_json().unwrap()["error"],
        "unable to start delayed VM vm-2"
    );

    // The experiment-level outcome is untouched.
    assert_eq!(emitter.statuses().last(), Some(&ResourceStatus::Start));
    assert_eq!(emitter.count(ResourceStatus::ErrorStarting), 0);
}

#[tokio::test(start_paused = true)]
async fn app_scheduling_failure_is_a_warning() {
    let runtime = Arc::new(ScriptedRuntime::new().with_experiment("exp1", 1));
    let emitter = RecordingEmitter::new();
    let orchestrator = builder(&runtime, &emitter)
        .scheduler(Arc::new(FailingScheduler::new(DomainError::Backend(
            "app config invalid".into(),
        ))))
        .build();

    let outcome = orchestrator.start("exp1").await.unwrap();

    assert_eq!(outcome.warnings().len(), 1);
    assert!(outcome.warnings()[0].contains("app config invalid"));
    assert_eq!(emitter.statuses().last(), Some(&ResourceStatus::Start));
    assert!(runtime.is_running("exp1"));
    // Only the provisioning context stays registered.
    assert_eq!(orchestrator.tasks().handle_count("exp1"), 1);
}

#[tokio::test(start_paused = true)]
async fn progress_never_goes_backwards() {
    let gate = Arc::new(Notify::new());
    let runtime = Arc::new(
        ScriptedRuntime::new()
            .with_experiment("exp1", 4)
            .with_start_gate(gate.clone()),
    );
    let probe = Arc::new(
        ScriptedProbe::scripted(vec![
            Ok(0.5),
            Ok(0.2),
            Err(DomainError::Backend("probe offline".into())),
            Ok(f64::NAN),
            Ok(1.4),
            Ok(0.9),
        ])
        .notify_after(6, gate),
    );
    let emitter = RecordingEmitter::new();
    let orchestrator = builder(&runtime, &emitter).probe(probe).build();

    orchestrator.start("exp1").await.unwrap();

    let progress = emitter.progress();
    assert_eq!(progress, vec![0.5, 0.5, 0.5, 1.0, 1.0]);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test(start_paused = true)]
async fn different_experiments_start_concurrently() {
    let runtime = Arc::new(
        ScriptedRuntime::new()
            .with_experiment("exp1", 1)
            .with_experiment("exp2", 2),
    );
    let emitter = RecordingEmitter::new();
    let orchestrator = builder(&runtime, &emitter).build();

    let (first, second) = tokio::join!(orchestrator.start("exp1"), orchestrator.start("exp2"));

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert!(runtime.is_running("exp1"));
    assert!(runtime.is_running("exp2"));
    assert_eq!(emitter.count(ResourceStatus::Start), 2);
}

#[tokio::test(start_paused = true)]
async fn unbuildable_body_fails_start_as_internal() {
    let runtime = Arc::new(ScriptedRuntime::new().with_experiment("exp1", 2));
    let serializer = Arc::new(FailingSerializer::new());
    let emitter = RecordingEmitter::new();
    let orchestrator = builder(&runtime, &emitter)
        .serializer(serializer.clone())
        .build();

    let err = orchestrator.start("exp1").await.unwrap_err();

    assert_eq!(err.class(), ErrorClass::Internal);
    assert_eq!(err.http_status(), 500);
    assert!(matches!(err, LifecycleError::Serialization { .. }));
    assert_eq!(serializer.calls(), 1);
    assert_eq!(
        emitter.statuses(),
        vec![ResourceStatus::Starting, ResourceStatus::Progress]
    );
    assert!(orchestrator.locks().is_empty());

    // The experiment did start, so its contexts stay registered for a stop.
    assert!(runtime.is_running("exp1"));
    assert_eq!(orchestrator.tasks().handle_count("exp1"), 2);
}

#[tokio::test(start_paused = true)]
async fn crashed_provisioning_reports_error_starting() {
    let runtime = Arc::new(
        ScriptedRuntime::new()
            .with_experiment("exp1", 2)
            .with_panicking_start(),
    );
    let emitter = RecordingEmitter::new();
    let orchestrator = builder(&runtime, &emitter).build();

    let err = orchestrator.start("exp1").await.unwrap_err();

    assert_eq!(err.class(), ErrorClass::BadRequest);
    assert!(matches!(
        err,
        LifecycleError::Domain {
            source: DomainError::Backend(_),
            ..
        }
    ));
    assert_eq!(
        emitter.statuses().last(),
        Some(&ResourceStatus::ErrorStarting)
    );
    assert_eq!(emitter.count(ResourceStatus::Start), 0);
    assert_eq!(orchestrator.locks().state("exp1"), LockState::Free);
    assert_eq!(orchestrator.tasks().handle_count("exp1"), 0);
    eventually(|| orchestrator.tasks().pending("exp1") == 0).await;

    // A retry is admitted once the crash is handled.
    assert!(orchestrator.locks().acquire("exp1", LockIntent::Starting).is_ok());
}

#[tokio::test(start_paused = true)]
async fn runtime_notes_drain_and_helpers_exit_without_stop() {
    let runtime = Arc::new(
        ScriptedRuntime::new()
            .with_experiment("exp1", 2)
            .with_notes(vec![
                "reserved host node-a".into(),
                "wired bridge exp1_net".into(),
            ]),
    );
    let emitter = RecordingEmitter::new();
    let orchestrator = builder(&runtime, &emitter).build();

    orchestrator.start("exp1").await.unwrap();

    // The runtime dropped its delayed-error sender when start returned, so
    // the listener closes and tells the drainer to stop.
    eventually(|| orchestrator.tasks().pending("exp1") == 0).await;

    let notes = runtime.last_notes().expect("notes handed to start");
    assert!(notes.is_empty());
    assert_eq!(runtime.journal().count("runtime:stop:exp1"), 0);
    assert!(orchestrator.tasks().contains("exp1"));
    assert!(runtime.is_running("exp1"));
}
