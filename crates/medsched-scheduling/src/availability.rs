//! Availability engine: the single authority for time-range exclusivity.
//!
//! Each practitioner owns one [`Calendar`] entry in a concurrent map. All
//! mutation of a calendar happens under that entry's exclusive guard, so
//! "check pool / remove or insert" is one atomic unit per practitioner and
//! cross-practitioner operations never contend.

use dashmap::DashMap;
use medsched_core::{
    CoreError, EventBroadcaster, Result, SchedulingEvent, Slot, TimeRange, now_utc,
};
use std::sync::Arc;
use time::Duration;
use uuid::Uuid;

/// Published slot duration bounds, in minutes.
pub const MIN_SLOT_MINUTES: i64 = 15;
pub const MAX_SLOT_MINUTES: i64 = 240;

/// One practitioner's calendar: open/blocked slots plus consumed ranges.
///
/// `slots` stays sorted by start time. `booked` holds ranges consumed by
/// active appointments; `release` moves them back.
#[derive(Debug, Default)]
struct Calendar {
    slots: Vec<Slot>,
    booked: Vec<TimeRange>,
}

impl Calendar {
    fn insert_slot(&mut self, slot: Slot) {
        let at = self
            .slots
            .partition_point(|s| (s.start, s.end) <= (slot.start, slot.end));
        self.slots.insert(at, slot);
    }

    fn insert_booked(&mut self, range: TimeRange) {
        let at = self.booked.partition_point(|r| r.start <= range.start);
        self.booked.insert(at, range);
    }

    fn overlaps_any(&self, range: &TimeRange) -> bool {
        self.slots.iter().any(|s| s.overlaps(range))
            || self.booked.iter().any(|r| r.overlaps(range))
    }
}

/// Maintains, per practitioner, the ordered pool of free slots and provides
/// atomic reservation.
pub struct AvailabilityEngine {
    calendars: DashMap<Uuid, Calendar>,
    events: Arc<EventBroadcaster>,
}

impl AvailabilityEngine {
    pub fn new(events: Arc<EventBroadcaster>) -> Self {
        Self {
            calendars: DashMap::new(),
            events,
        }
    }

    pub fn new_shared(events: Arc<EventBroadcaster>) -> Arc<Self> {
        Arc::new(Self::new(events))
    }

    /// Open slots for a practitioner, sorted ascending by start.
    ///
    /// Pure read; blocked slots are not part of the available pool.
    pub fn list_available(&self, practitioner_id: Uuid) -> Vec<Slot> {
        self.calendars
            .get(&practitioner_id)
            .map(|cal| cal.slots.iter().filter(|s| !s.blocked).copied().collect())
            .unwrap_or_default()
    }

    /// Publish a new open slot.
    ///
    /// Rejects durations outside `[15, 240]` minutes and starts in the past
    /// with `Validation`; rejects ranges overlapping any existing slot or
    /// consumed range with `Conflict`.
    pub fn publish(
        &self,
        practitioner_id: Uuid,
        start: time::OffsetDateTime,
        duration_minutes: i64,
    ) -> Result<Slot> {
        if !(MIN_SLOT_MINUTES..=MAX_SLOT_MINUTES).contains(&duration_minutes) {
            return Err(CoreError::validation(format!(
                "duration must be between {MIN_SLOT_MINUTES} and {MAX_SLOT_MINUTES} minutes, got {duration_minutes}"
            )));
        }
        if start < now_utc() {
            return Err(CoreError::validation("slot start is in the past"));
        }
        let range = TimeRange::new(start, start + Duration::minutes(duration_minutes));

        let mut cal = self.calendars.entry(practitioner_id).or_default();
        if cal.overlaps_any(&range) {
            return Err(CoreError::conflict(format!(
                "range {}..{} overlaps the existing calendar",
                range.start, range.end
            )));
        }
        let slot = Slot::open(range.start, range.end);
        cal.insert_slot(slot);
        drop(cal);

        tracing::debug!(practitioner_id = %practitioner_id, start = %start, "slot published");
        self.events.send(SchedulingEvent::SlotPublished {
            practitioner_id,
            range,
        });
        Ok(slot)
    }

    /// Atomically consume the exact open slot matching `range`.
    ///
    /// Exactly one of any number of concurrent callers for the same slot
    /// succeeds; the rest observe `Conflict`. Reservation success is the
    /// single source of truth for who wins a contested slot.
    pub fn reserve(&self, practitioner_id: Uuid, range: TimeRange) -> Result<()> {
        let mut cal = self.calendars.entry(practitioner_id).or_default();
        let Some(at) = cal
            .slots
            .iter()
            .position(|s| !s.blocked && s.matches(&range))
        else {
            return Err(CoreError::conflict("slot no longer available"));
        };
        cal.slots.remove(at);
        cal.insert_booked(range);
        drop(cal);

        tracing::debug!(practitioner_id = %practitioner_id, start = %range.start, "slot reserved");
        self.events.send(SchedulingEvent::SlotConsumed {
            practitioner_id,
            range,
        });
        Ok(())
    }

    /// Return a consumed range to the open pool.
    ///
    /// Idempotent: a range already present in the pool is left alone, as is a
    /// range that has since been superseded by an overlapping publish.
    pub fn release(&self, practitioner_id: Uuid, range: TimeRange) {
        let mut cal = self.calendars.entry(practitioner_id).or_default();
        cal.booked.retain(|r| r != &range);
        if cal.slots.iter().any(|s| s.overlaps(&range)) {
            return;
        }
        cal.insert_slot(Slot::open(range.start, range.end));
        drop(cal);

        tracing::debug!(practitioner_id = %practitioner_id, start = %range.start, "slot released");
        self.events.send(SchedulingEvent::SlotReleased {
            practitioner_id,
            range,
        });
    }

    /// Block a time range (lunch break, leave). Blocked slots never appear in
    /// the available pool and can never be reserved.
    pub fn block(&self, practitioner_id: Uuid, range: TimeRange) -> Result<()> {
        if !range.is_valid() {
            return Err(CoreError::validation("start must be before end"));
        }
        let mut cal = self.calendars.entry(practitioner_id).or_default();
        if cal.overlaps_any(&range) {
            return Err(CoreError::conflict(
                "range overlaps the existing calendar",
            ));
        }
        cal.insert_slot(Slot::blocked(range.start, range.end));
        Ok(())
    }

    /// Remove the exact blocked range; no-op if absent.
    pub fn unblock(&self, practitioner_id: Uuid, range: TimeRange) {
        if let Some(mut cal) = self.calendars.get_mut(&practitioner_id) {
            cal.slots.retain(|s| !(s.blocked && s.matches(&range)));
        }
    }
}
