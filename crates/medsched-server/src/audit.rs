//! Async audit hook.
//!
//! Logs every committed scheduling change without blocking the operation that
//! produced it. The log line is the audit trail; there is no audit store.

use async_trait::async_trait;
use medsched_core::events::{EventEnvelope, HookError, SchedulingEvent, SchedulingHook};
use tracing::info;

/// Hook that writes one structured log line per scheduling event.
pub struct AuditHook;

#[async_trait]
impl SchedulingHook for AuditHook {
    fn name(&self) -> &str {
        "audit"
    }

    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), HookError> {
        match &envelope.event {
            SchedulingEvent::SlotPublished {
                practitioner_id,
                range,
            } => info!(
                target: "medsched::audit",
                %practitioner_id,
                start = %range.start,
                end = %range.end,
                "slot published"
            ),
            SchedulingEvent::SlotConsumed {
                practitioner_id,
                range,
            } => info!(
                target: "medsched::audit",
                %practitioner_id,
                start = %range.start,
                end = %range.end,
                "slot consumed"
            ),
            SchedulingEvent::SlotReleased {
                practitioner_id,
                range,
            } => info!(
                target: "medsched::audit",
                %practitioner_id,
                start = %range.start,
                end = %range.end,
                "slot released"
            ),
            SchedulingEvent::AppointmentChanged { id, new_status } => info!(
                target: "medsched::audit",
                appointment_id = %id,
                status = %new_status,
                "appointment changed"
            ),
        }
        Ok(())
    }
}
