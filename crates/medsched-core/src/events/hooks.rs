//! Hook traits for the scheduling event system.
//!
//! Hooks are asynchronous handlers that react to scheduling events. They run
//! in their own tokio task, and an error in one hook never propagates back to
//! the operation that emitted the event.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::broadcaster::EventBroadcaster;
use super::types::{EventEnvelope, SchedulingEvent};

/// Error type for hook operations.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Hook execution failed with a message.
    #[error("Hook execution failed: {0}")]
    Execution(String),

    /// Hook failed to send to an internal channel.
    #[error("Channel send failed: {0}")]
    Channel(String),
}

impl HookError {
    /// Create an execution error from a string.
    pub fn execution(msg: impl Into<String>) -> Self {
        HookError::Execution(msg.into())
    }
}

/// Trait for scheduling event hooks.
///
/// # Implementation Notes
///
/// - Hooks should be quick and non-blocking
/// - For heavy work, send to an internal channel and return immediately
/// - Errors are logged but don't propagate to the event source
#[async_trait]
pub trait SchedulingHook: Send + Sync {
    /// Unique name for this hook (for logging).
    fn name(&self) -> &str;

    /// Handle a scheduling event.
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), HookError>;

    /// Check if this hook should handle the given event.
    ///
    /// Default implementation returns true for all events.
    fn matches(&self, _event: &SchedulingEvent) -> bool {
        true
    }
}

/// Subscribe a hook to a broadcaster and drive it in a background task.
///
/// The task ends when the broadcaster is dropped. Lagged receivers skip the
/// missed events and keep going.
pub fn spawn_hook(broadcaster: &EventBroadcaster, hook: Arc<dyn SchedulingHook>) -> JoinHandle<()> {
    let mut rx = broadcaster.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    if !hook.matches(&envelope.event) {
                        continue;
                    }
                    if let Err(e) = hook.handle(&envelope).await {
                        tracing::warn!(hook = hook.name(), error = %e, "hook failed");
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(hook = hook.name(), missed, "hook lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::AppointmentStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHook {
        seen: AtomicUsize,
        appointments_only: bool,
    }

    #[async_trait]
    impl SchedulingHook for CountingHook {
        fn name(&self) -> &str {
            "counting"
        }

        async fn handle(&self, _envelope: &EventEnvelope) -> Result<(), HookError> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn matches(&self, event: &SchedulingEvent) -> bool {
            !self.appointments_only
                || matches!(event, SchedulingEvent::AppointmentChanged { .. })
        }
    }

    fn changed() -> SchedulingEvent {
        SchedulingEvent::AppointmentChanged {
            id: crate::id::generate_id(),
            new_status: AppointmentStatus::Confirmed,
        }
    }

    #[tokio::test]
    async fn test_hook_receives_events() {
        let broadcaster = EventBroadcaster::new();
        let hook = Arc::new(CountingHook {
            seen: AtomicUsize::new(0),
            appointments_only: false,
        });
        let handle = spawn_hook(&broadcaster, hook.clone());

        broadcaster.send(changed());
        broadcaster.send(changed());
        drop(broadcaster);
        handle.await.unwrap();

        assert_eq!(hook.seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_hook_filter_skips_events() {
        let broadcaster = EventBroadcaster::new();
        let hook = Arc::new(CountingHook {
            seen: AtomicUsize::new(0),
            appointments_only: true,
        });
        let handle = spawn_hook(&broadcaster, hook.clone());

        broadcaster.send(SchedulingEvent::SlotReleased {
            practitioner_id: crate::id::generate_id(),
            range: crate::slot::TimeRange::new(
                crate::time::now_utc(),
                crate::time::now_utc() + time::Duration::minutes(30),
            ),
        });
        broadcaster.send(changed());
        drop(broadcaster);
        handle.await.unwrap();

        assert_eq!(hook.seen.load(Ordering::SeqCst), 1);
    }
}
