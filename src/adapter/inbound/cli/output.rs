//! Terminal output for lifecycle results and events.

use std::io::{self, Write};

use crate::application::LifecycleOutcome;
use crate::domain::BroadcastEvent;

/// Write the outcome body to stdout and its warnings to stderr.
pub fn outcome(outcome: &LifecycleOutcome) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(outcome.body())?;
    writeln!(stdout)?;

    for warning in outcome.warnings() {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

/// One-line rendering of a broadcast event.
#[must_use]
pub fn event_line(event: &BroadcastEvent) -> String {
    let mut line = format!(
        "{} {} {} {}",
        event.routing_key,
        event.resource.kind.as_str(),
        event.resource.id,
        event.status()
    );
    if let Some(payload) = event.payload_json() {
        if event.payload.as_ref().map_or(0, Vec::len) <= 128 {
            line.push(' ');
            line.push_str(&payload.to_string());
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::progress::progress_payload;
    use crate::domain::{Operation, ResourceStatus};

    #[test]
    fn test_event_line_includes_small_payloads() {
        let event = BroadcastEvent::experiment(
            Operation::Start,
            "exp1",
            ResourceStatus::Progress,
            Some(progress_payload(0.5)),
        );
        assert_eq!(
            event_line(&event),
            r#"experiments/start:update:exp1 experiment exp1 progress {"percent":0.5}"#
        );
    }

    #[test]
    fn test_event_line_without_payload() {
        let event = BroadcastEvent::experiment(Operation::Stop, "exp1", ResourceStatus::Stopping, None);
        assert_eq!(
            event_line(&event),
            "experiments/stop:update:exp1 experiment exp1 stopping"
        );
    }
}
