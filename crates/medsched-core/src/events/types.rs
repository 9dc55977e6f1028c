//! Event types emitted by the scheduling core.
//!
//! Every committed transition and slot mutation produces one event on the
//! broadcast channel, letting in-process collaborators subscribe instead of
//! polling the HTTP surface.

use crate::appointment::AppointmentStatus;
use crate::slot::TimeRange;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Event emitted by the scheduling core on each committed change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulingEvent {
    /// A slot was published on a practitioner's calendar.
    SlotPublished {
        practitioner_id: Uuid,
        range: TimeRange,
    },
    /// A slot was consumed by a booking.
    SlotConsumed {
        practitioner_id: Uuid,
        range: TimeRange,
    },
    /// A previously booked range returned to the pool.
    SlotReleased {
        practitioner_id: Uuid,
        range: TimeRange,
    },
    /// An appointment's status changed (including creation).
    AppointmentChanged {
        id: Uuid,
        new_status: AppointmentStatus,
    },
}

impl SchedulingEvent {
    /// Short tag for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            SchedulingEvent::SlotPublished { .. } => "slot_published",
            SchedulingEvent::SlotConsumed { .. } => "slot_consumed",
            SchedulingEvent::SlotReleased { .. } => "slot_released",
            SchedulingEvent::AppointmentChanged { .. } => "appointment_changed",
        }
    }
}

/// A scheduling event with its emission timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(flatten)]
    pub event: SchedulingEvent,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl EventEnvelope {
    pub fn new(event: SchedulingEvent) -> Self {
        Self {
            event,
            timestamp: crate::time::now_utc(),
        }
    }
}
