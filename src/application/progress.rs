//! Provisioning progress reporting.
//!
//! While a start is in flight the orchestrator polls the launch probe at a
//! fixed cadence and broadcasts the running maximum of the readings, so
//! subscribers never see progress go backwards.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use crate::domain::{BroadcastEvent, Operation, ResourceStatus};
use crate::error::DomainError;
use crate::port::{EventEmitter, LaunchProbe};

/// Polls and broadcasts progress for one start call.
///
/// A new reporter is built for every start, which resets the clamp.
pub struct ProgressReporter {
    name: String,
    expected: usize,
    probe: Arc<dyn LaunchProbe>,
    emitter: Arc<dyn EventEmitter>,
    current: f64,
}

impl ProgressReporter {
    pub fn new(
        name: impl Into<String>,
        expected: usize,
        probe: Arc<dyn LaunchProbe>,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        Self {
            name: name.into(),
            expected,
            probe,
            emitter,
            current: 0.0,
        }
    }

    /// Highest progress broadcast so far.
    #[must_use]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Fold a raw reading into the clamp and return the value to broadcast.
    ///
    /// Readings are bounded to `[0, 1]`; NaN readings are ignored.
    pub fn observe(&mut self, raw: f64) -> f64 {
        if !raw.is_nan() {
            self.current = self.current.max(raw.clamp(0.0, 1.0));
        }
        self.current
    }

    /// Ask the probe for a fresh reading.
    pub async fn poll(&self) -> Result<f64, DomainError> {
        self.probe.launch_progress(&self.name, self.expected).await
    }

    /// Poll once and broadcast the clamped value.
    ///
    /// Probe failures are logged and skipped; they never abort a start.
    pub async fn tick(&mut self) -> Option<f64> {
        match self.poll().await {
            Ok(raw) => {
                let progress = self.observe(raw);
                debug!(
                    experiment = %self.name,
                    percent = progress * 100.0,
                    "Percent deployed"
                );
                self.emitter.broadcast(BroadcastEvent::experiment(
                    Operation::Start,
                    &self.name,
                    ResourceStatus::Progress,
                    Some(progress_payload(progress)),
                ));
                Some(progress)
            }
            Err(e) => {
                error!(experiment = %self.name, error = %e, "Getting launch progress failed");
                None
            }
        }
    }

    /// Tick every `every` until `terminal` resolves, then return its output.
    ///
    /// The first tick fires immediately. The terminal future is always
    /// checked before the ticker, so no tick runs once a result is ready.
    pub async fn run_until<F>(&mut self, every: Duration, terminal: F) -> F::Output
    where
        F: Future,
    {
        tokio::pin!(terminal);
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                output = &mut terminal => return output,
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
    }
}

/// Body of a `progress` event.
#[must_use]
pub fn progress_payload(progress: f64) -> Vec<u8> {
    serde_json::json!({ "percent": progress })
        .to_string()
        .into_bytes()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::port::NullEmitter;

    struct Readings(Mutex<Vec<Result<f64, DomainError>>>);

    #[async_trait]
    impl LaunchProbe for Readings {
        async fn launch_progress(&self, _name: &str, _expected: usize) -> Result<f64, DomainError> {
            let mut readings = self.0.lock();
            if readings.is_empty() {
                Ok(1.0)
            } else {
                readings.remove(0)
            }
        }
    }

    fn reporter(readings: Vec<Result<f64, DomainError>>) -> ProgressReporter {
        ProgressReporter::new(
            "exp1",
            3,
            Arc::new(Readings(Mutex::new(readings))),
            Arc::new(NullEmitter),
        )
    }

    #[test]
    fn test_observe_never_regresses() {
        let mut reporter = reporter(vec![]);
        assert_eq!(reporter.observe(0.4), 0.4);
        assert_eq!(reporter.observe(0.1), 0.4);
        assert_eq!(reporter.observe(0.9), 0.9);
        assert_eq!(reporter.current(), 0.9);
    }

    #[test]
    fn test_observe_bounds_readings() {
        let mut reporter = reporter(vec![]);
        assert_eq!(reporter.observe(-0.5), 0.0);
        assert_eq!(reporter.observe(f64::NAN), 0.0);
        assert_eq!(reporter.observe(1.7), 1.0);
    }

    #[tokio::test]
    async fn test_tick_skips_probe_errors() {
        let mut reporter = reporter(vec![
            Ok(0.25),
            Err(DomainError::Backend("probe offline".into())),
            Ok(0.5),
        ]);

        assert_eq!(reporter.tick().await, Some(0.25));
        assert_eq!(reporter.tick().await, None);
        assert_eq!(reporter.current(), 0.25);
        assert_eq!(reporter.tick().await, Some(0.5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_stops_at_terminal() {
        let mut reporter = reporter(vec![Ok(0.2), Ok(0.6), Ok(0.8)]);

        reporter
            .run_until(
                Duration::from_secs(2),
                tokio::time::sleep(Duration::from_secs(3)),
            )
            .await;

        // Ticks at 0s and 2s, terminal at 3s
        assert_eq!(reporter.current(), 0.6);
    }

    #[test]
    fn test_progress_payload_shape() {
        let body: serde_json::Value =
            serde_json::from_slice(&progress_payload(0.5)).expect("valid json");
        assert_eq!(body, serde_json::json!({ "percent": 0.5 }));
    }
}
