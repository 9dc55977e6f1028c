//! Event broadcaster for the scheduling event system.
//!
//! Built on tokio's broadcast channel: multi-producer, multi-consumer, with
//! best-effort delivery. Slow receivers may miss events; the HTTP surface
//! remains the authoritative view of state.

use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::{EventEnvelope, SchedulingEvent};

/// Default buffer size for the broadcast channel.
const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Broadcaster for scheduling events.
///
/// Thread-safe and cheaply cloneable; multiple subscribers receive events
/// from a single sender.
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBroadcaster {
    /// Create a new broadcaster with default buffer size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    /// Create a new broadcaster with custom buffer size.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new broadcaster wrapped in an Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Send an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event; 0 when
    /// nobody is listening, which is not an error.
    pub fn send(&self, event: SchedulingEvent) -> usize {
        tracing::trace!(event = event.kind(), "scheduling event");
        self.sender.send(EventEnvelope::new(event)).unwrap_or_default()
    }

    /// Subscribe to events.
    ///
    /// Events sent before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
