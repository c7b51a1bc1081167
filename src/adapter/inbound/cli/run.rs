//! Handlers for the lifecycle commands.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::command::{Cli, Commands};
use super::output;
use crate::adapter::outbound::channel::ChannelEmitter;
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_runtime, Runtime};
use crate::infrastructure::config::Config;
use crate::runtime::{cancellation, CancelHandle, Cancellation};

/// Execute the parsed command against a freshly wired runtime.
pub async fn execute(cli: &Cli, config: &Config) -> Result<()> {
    let Runtime {
        orchestrator,
        events,
        sandbox,
    } = build_runtime(config);
    let watcher = cli.watch.then(|| {
        let (handle, finished) = cancellation();
        (handle, spawn_watcher(&events, finished))
    });

    match &cli.command {
        Commands::Start(args) => {
            let outcome = orchestrator.start(&args.name).await?;
            output::outcome(&outcome)?;
        }
        Commands::Stop(args) => {
            let outcome = orchestrator.stop(&args.name).await?;
            output::outcome(&outcome)?;
        }
        Commands::Cycle(args) => {
            let started = orchestrator.start(&args.name).await?;
            output::outcome(&started)?;
            if args.hold_ms > 0 {
                tokio::time::sleep(Duration::from_millis(args.hold_ms)).await;
            }
            let stopped = orchestrator.stop(&args.name).await?;
            output::outcome(&stopped)?;
            info!(
                experiment = %args.name,
                app_runs = sandbox.app_runs(&args.name),
                "Cycle complete"
            );
        }
        Commands::Status(args) => {
            let status = orchestrator.status(&args.name).await?;
            println!("{status}");
        }
    }

    if let Some((handle, watcher)) = watcher {
        finish_watcher(handle, watcher).await;
    }
    Ok(())
}

/// Print events as they are broadcast until `finished` fires, then flush
/// whatever is still buffered.
fn spawn_watcher(events: &Arc<ChannelEmitter>, finished: Cancellation) -> JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                () = finished.cancelled() => break,
                received = rx.recv() => match received {
                    Ok(event) => eprintln!("{}", output::event_line(&event)),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event watcher fell behind");
                    }
                    Err(RecvError::Closed) => return,
                },
            }
        }
        loop {
            match rx.try_recv() {
                Ok(event) => eprintln!("{}", output::event_line(&event)),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event watcher fell behind");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    })
}

async fn finish_watcher(handle: CancelHandle, watcher: JoinHandle<()>) {
    handle.cancel();
    if let Err(e) = watcher.await {
        warn!(error = %e, "Event watcher failed");
    }
}
