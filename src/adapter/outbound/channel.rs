//! In-process fan-out of broadcast events.

use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::BroadcastEvent;
use crate::port::EventEmitter;

/// Publishes events on a tokio broadcast channel.
///
/// Subscribers that fall behind lose the oldest events; publishing never
/// blocks and succeeds even when nobody is subscribed.
pub struct ChannelEmitter {
    tx: broadcast::Sender<BroadcastEvent>,
}

impl ChannelEmitter {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventEmitter for ChannelEmitter {
    fn broadcast(&self, event: BroadcastEvent) {
        if self.tx.send(event).is_err() {
            trace!("No broadcast subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Operation, ResourceStatus};

    #[tokio::test]
    async fn test_every_subscriber_receives_events() {
        let emitter = ChannelEmitter::new(8);
        let mut first = emitter.subscribe();
        let mut second = emitter.subscribe();
        assert_eq!(emitter.subscriber_count(), 2);

        emitter.broadcast(BroadcastEvent::experiment(
            Operation::Stop,
            "exp1",
            ResourceStatus::Stopping,
            None,
        ));

        assert_eq!(
            first.recv().await.unwrap().status(),
            ResourceStatus::Stopping
        );
        assert_eq!(second.recv().await.unwrap().resource.id, "exp1");
    }

    #[test]
    fn test_broadcast_without_subscribers_is_fine() {
        let emitter = ChannelEmitter::new(1);
        emitter.broadcast(BroadcastEvent::delayed_vm_failure("exp1", "vm-1"));
        assert_eq!(emitter.subscriber_count(), 0);
    }
}
