//! Broadcast events.
//!
//! An event names who should receive it ([`RoutingKey`]), which resource
//! changed ([`Resource`]) and an optional, already serialized payload.

use std::fmt;

use chrono::{DateTime, Utc};

use super::status::{LifecycleStatus, Operation};

/// Request policy an event is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingKey {
    /// Resource path, e.g. `experiments/start`.
    pub resource: &'static str,
    /// Verb subscribers must be allowed to see, e.g. `update`.
    pub verb: &'static str,
    /// Experiment name the policy is scoped to.
    pub name: String,
}

impl RoutingKey {
    /// Routing key for updates produced by a lifecycle operation.
    #[must_use]
    pub fn lifecycle(operation: Operation, name: impl Into<String>) -> Self {
        let resource = match operation {
            Operation::Start => "experiments/start",
            Operation::Stop => "experiments/stop",
        };
        Self {
            resource,
            verb: "update",
            name: name.into(),
        }
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.resource, self.verb, self.name)
    }
}

/// Kind of resource an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Experiment,
    ExperimentVm,
}

impl ResourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Experiment => "experiment",
            Self::ExperimentVm => "experiment/vm",
        }
    }
}

/// Status carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStatus {
    Starting,
    Progress,
    Start,
    ErrorStarting,
    Stopping,
    Stop,
    ErrorStopping,
    /// Resource-scoped failure, e.g. a VM that failed after the start returned.
    Error,
}

impl ResourceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Progress => "progress",
            Self::Start => "start",
            Self::ErrorStarting => "errorStarting",
            Self::Stopping => "stopping",
            Self::Stop => "stop",
            Self::ErrorStopping => "errorStopping",
            Self::Error => "error",
        }
    }

    /// Lifecycle status an experiment is in after this event, if any.
    #[must_use]
    pub const fn lifecycle(self) -> Option<LifecycleStatus> {
        match self {
            Self::Starting | Self::Progress => Some(LifecycleStatus::Starting),
            Self::Start => Some(LifecycleStatus::Running),
            Self::ErrorStarting => Some(LifecycleStatus::ErrorStarting),
            Self::Stopping => Some(LifecycleStatus::Stopping),
            Self::Stop => Some(LifecycleStatus::Stopped),
            Self::ErrorStopping => Some(LifecycleStatus::ErrorStopping),
            Self::Error => None,
        }
    }

    /// True for the event that closes a lifecycle operation.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Start | Self::ErrorStarting | Self::Stop | Self::ErrorStopping
        )
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resource an event is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub id: String,
    pub status: ResourceStatus,
}

/// Fire-and-forget notification about a resource state change.
#[derive(Debug, Clone)]
pub struct BroadcastEvent {
    pub routing_key: RoutingKey,
    pub resource: Resource,
    /// Serialized body, absent for pure state transitions.
    pub payload: Option<Vec<u8>>,
    pub emitted_at: DateTime<Utc>,
}

impl BroadcastEvent {
    /// Experiment-scoped event emitted by a lifecycle operation.
    #[must_use]
    pub fn experiment(
        operation: Operation,
        name: &str,
        status: ResourceStatus,
        payload: Option<Vec<u8>>,
    ) -> Self {
        Self {
            routing_key: RoutingKey::lifecycle(operation, name),
            resource: Resource {
                kind: ResourceKind::Experiment,
                id: name.to_string(),
                status,
            },
            payload,
            emitted_at: Utc::now(),
        }
    }

    /// VM-scoped error for a VM that failed after the start returned.
    #[must_use]
    pub fn delayed_vm_failure(name: &str, vm: &str) -> Self {
        let payload = serde_json::json!({
            "error": format!("unable to start delayed VM {vm}"),
        });
        Self {
            routing_key: RoutingKey::lifecycle(Operation::Start, name),
            resource: Resource {
                kind: ResourceKind::ExperimentVm,
                id: format!("{name}/{vm}"),
                status: ResourceStatus::Error,
            },
            payload: Some(payload.to_string().into_bytes()),
            emitted_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn status(&self) -> ResourceStatus {
        self.resource.status
    }

    /// Payload decoded as JSON, when present and well formed.
    #[must_use]
    pub fn payload_json(&self) -> Option<serde_json::Value> {
        self.payload
            .as_deref()
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_routing_keys() {
        let start = RoutingKey::lifecycle(Operation::Start, "exp1");
        assert_eq!(start.to_string(), "experiments/start:update:exp1");

        let stop = RoutingKey::lifecycle(Operation::Stop, "exp1");
        assert_eq!(stop.resource, "experiments/stop");
    }

    #[test]
    fn test_delayed_vm_failure_is_vm_scoped() {
        let event = BroadcastEvent::delayed_vm_failure("exp1", "vm-2");

        assert_eq!(event.resource.kind, ResourceKind::ExperimentVm);
        assert_eq!(event.resource.id, "exp1/vm-2");
        assert_eq!(event.status(), ResourceStatus::Error);
        assert_eq!(
            event.payload_json(),
            Some(serde_json::json!({"error": "unable to start delayed VM vm-2"}))
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ResourceStatus::Start.is_terminal());
        assert!(ResourceStatus::ErrorStopping.is_terminal());
        assert!(!ResourceStatus::Progress.is_terminal());
        assert!(!ResourceStatus::Error.is_terminal());
        assert_eq!(ResourceStatus::ErrorStarting.as_str(), "errorStarting");
        assert_eq!(
            ResourceStatus::Stop.lifecycle(),
            Some(LifecycleStatus::Stopped)
        );
    }
}
