//! Event emitter port for broadcast events.
//!
//! This module defines the trait the orchestrator publishes lifecycle events
//! through. Delivery and fan-out to subscribers belong to the implementation.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{BroadcastEvent, ResourceStatus};

/// Trait for broadcast transports.
///
/// Broadcasts are fire-and-forget: no acknowledgment is awaited and a failed
/// delivery never fails the lifecycle operation that produced the event.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - `broadcast` is called from inside lifecycle operations and background
///   tasks, so it must return quickly and never block
pub trait EventEmitter: Send + Sync {
    fn broadcast(&self, event: BroadcastEvent);
}

impl<T: EventEmitter + ?Sized> EventEmitter for Arc<T> {
    fn broadcast(&self, event: BroadcastEvent) {
        (**self).broadcast(event);
    }
}

/// Registry of emitters (composite pattern).
///
/// Broadcasts every event to all registered emitters.
pub struct EmitterRegistry {
    emitters: Vec<Box<dyn EventEmitter>>,
}

impl EmitterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { emitters: vec![] }
    }

    /// Register an emitter.
    pub fn register(&mut self, emitter: Box<dyn EventEmitter>) {
        self.emitters.push(emitter);
    }

    /// Number of registered emitters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }
}

impl EventEmitter for EmitterRegistry {
    fn broadcast(&self, event: BroadcastEvent) {
        for emitter in &self.emitters {
            emitter.broadcast(event.clone());
        }
    }
}

impl Default for EmitterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// An emitter that drops every event.
pub struct NullEmitter;

impl EventEmitter for NullEmitter {
    fn broadcast(&self, _event: BroadcastEvent) {}
}

/// An emitter that logs events via tracing.
pub struct LogEmitter;

impl EventEmitter for LogEmitter {
    fn broadcast(&self, event: BroadcastEvent) {
        let payload_bytes = event.payload.as_ref().map_or(0, Vec::len);
        match event.status() {
            ResourceStatus::Progress => {
                debug!(
                    routing_key = %event.routing_key,
                    resource = event.resource.kind.as_str(),
                    id = %event.resource.id,
                    payload_bytes,
                    "Broadcast progress"
                );
            }
            status => {
                info!(
                    routing_key = %event.routing_key,
                    resource = event.resource.kind.as_str(),
                    id = %event.resource.id,
                    status = %status,
                    payload_bytes,
                    "Broadcast"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::Operation;

    struct Counting(Arc<AtomicUsize>);

    impl EventEmitter for Counting {
        fn broadcast(&self, _event: BroadcastEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_registry_fans_out_to_every_emitter() {
        let seen = Arc::new(AtomicUsize::new(0));
        let mut registry = EmitterRegistry::new();
        assert!(registry.is_empty());

        registry.register(Box::new(Counting(Arc::clone(&seen))));
        registry.register(Box::new(Counting(Arc::clone(&seen))));
        registry.register(Box::new(NullEmitter));
        assert_eq!(registry.len(), 3);

        registry.broadcast(BroadcastEvent::experiment(
            Operation::Start,
            "exp1",
            ResourceStatus::Starting,
            None,
        ));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
