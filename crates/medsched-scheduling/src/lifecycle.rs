//! Appointment state machine.
//!
//! Owns the authoritative appointment records and their status lifecycle.
//! Time-range exclusivity is delegated entirely to the availability engine:
//! reservation success is the single tie-break for contested slots, and the
//! state machine never re-checks practitioner overlap itself.

use dashmap::DashMap;
use medsched_auth::{Action, AuthContext, permit};
use medsched_core::{
    Appointment, AppointmentStatus, CoreError, EventBroadcaster, Result, SchedulingEvent,
    TimeRange, now_utc,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::availability::AvailabilityEngine;

/// Listing filter; all fields optional and combined with AND.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentFilter {
    pub practitioner_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

/// Owns appointment records; every mutation flows through one of the
/// transition operations below and emits a scheduling event on commit.
pub struct AppointmentStateMachine {
    availability: Arc<AvailabilityEngine>,
    appointments: DashMap<Uuid, Appointment>,
    events: Arc<EventBroadcaster>,
}

impl AppointmentStateMachine {
    pub fn new(availability: Arc<AvailabilityEngine>, events: Arc<EventBroadcaster>) -> Self {
        Self {
            availability,
            appointments: DashMap::new(),
            events,
        }
    }

    pub fn new_shared(
        availability: Arc<AvailabilityEngine>,
        events: Arc<EventBroadcaster>,
    ) -> Arc<Self> {
        Arc::new(Self::new(availability, events))
    }

    /// Book an appointment by consuming the exact matching open slot.
    ///
    /// The reservation happens first; when it fails nothing is created and
    /// the caller sees `Conflict`. A retried booking against an
    /// already-consumed slot therefore fails deterministically instead of
    /// double-booking.
    pub fn book(
        &self,
        actor: &AuthContext,
        patient_id: Uuid,
        practitioner_id: Uuid,
        range: TimeRange,
        specialty: Option<String>,
    ) -> Result<Appointment> {
        if !permit(Action::Book { patient_id }, actor, None) {
            return Err(CoreError::authorization("only the patient may book for themself"));
        }
        if !range.is_valid() {
            return Err(CoreError::validation("start must be before end"));
        }
        self.ensure_patient_free(patient_id, &range, None)?;

        self.availability.reserve(practitioner_id, range)?;

        let appointment = Appointment::new(patient_id, practitioner_id, range, specialty);
        tracing::info!(
            appointment_id = %appointment.id,
            practitioner_id = %practitioner_id,
            patient_id = %patient_id,
            "appointment booked"
        );
        self.appointments.insert(appointment.id, appointment.clone());
        self.events.send(SchedulingEvent::AppointmentChanged {
            id: appointment.id,
            new_status: AppointmentStatus::Scheduled,
        });
        Ok(appointment)
    }

    /// Confirm a scheduled appointment. Owner practitioner only.
    pub fn confirm(&self, actor: &AuthContext, id: Uuid) -> Result<Appointment> {
        let current = self.get_unchecked(id)?;
        if !permit(Action::Confirm, actor, Some(&current)) {
            return Err(CoreError::authorization("only the owning practitioner may confirm"));
        }
        self.transition(id, "confirm", |status| match status {
            AppointmentStatus::Scheduled => Some(AppointmentStatus::Confirmed),
            _ => None,
        })
    }

    /// Cancel an appointment and return its range to the pool.
    ///
    /// Terminal statuses reject the transition; the release is idempotent, so
    /// a client retrying a timed-out cancel cannot corrupt the pool.
    pub fn cancel(&self, actor: &AuthContext, id: Uuid) -> Result<Appointment> {
        let current = self.get_unchecked(id)?;
        if !permit(Action::Cancel, actor, Some(&current)) {
            return Err(CoreError::authorization(
                "only the owning patient or practitioner may cancel",
            ));
        }
        if current.start <= now_utc() {
            return Err(CoreError::validation("appointment has already started"));
        }
        let cancelled = self.transition(id, "cancel", |status| {
            status.is_active().then_some(AppointmentStatus::Cancelled)
        })?;
        self.availability
            .release(cancelled.practitioner_id, cancelled.range());
        Ok(cancelled)
    }

    /// Move an appointment to a new range.
    ///
    /// The new range is reserved **before** the old one is released, so a
    /// failed reservation leaves the original booking intact.
    pub fn reschedule(
        &self,
        actor: &AuthContext,
        id: Uuid,
        new_range: TimeRange,
    ) -> Result<Appointment> {
        let current = self.get_unchecked(id)?;
        if !permit(Action::Reschedule, actor, Some(&current)) {
            return Err(CoreError::authorization(
                "only the owning patient or practitioner may reschedule",
            ));
        }
        if !new_range.is_valid() {
            return Err(CoreError::validation("start must be before end"));
        }
        if current.status.is_terminal() {
            return Err(CoreError::invalid_transition(
                "reschedule",
                current.status.as_str(),
            ));
        }
        self.ensure_patient_free(current.patient_id, &new_range, Some(id))?;

        self.availability.reserve(current.practitioner_id, new_range)?;

        // The vacated range must be read under the entry's guard: a racing
        // reschedule may have moved the appointment since the snapshot above,
        // and releasing the stale range would strand the newer one in the
        // booked set.
        let mut old_range = current.range();
        let result = self.transition_with(id, "reschedule", |appt| {
            if appt.status.is_terminal() {
                return None;
            }
            old_range = appt.range();
            appt.start = new_range.start;
            appt.end = new_range.end;
            Some(AppointmentStatus::Rescheduled)
        });
        match result {
            Ok(updated) => {
                self.availability.release(updated.practitioner_id, old_range);
                Ok(updated)
            }
            Err(err) => {
                // Lost a race against a terminal transition; hand the new
                // range straight back.
                self.availability.release(current.practitioner_id, new_range);
                Err(err)
            }
        }
    }

    /// Mark a confirmed appointment as completed.
    ///
    /// Batch hook for the external process that closes out past visits; not
    /// reachable through the HTTP surface.
    pub fn complete(&self, id: Uuid) -> Result<Appointment> {
        self.transition(id, "complete", |status| match status {
            AppointmentStatus::Confirmed => Some(AppointmentStatus::Completed),
            _ => None,
        })
    }

    pub fn get(&self, actor: &AuthContext, id: Uuid) -> Result<Appointment> {
        let appointment = self.get_unchecked(id)?;
        if !permit(Action::ViewAppointment, actor, Some(&appointment)) {
            return Err(CoreError::authorization("no access to this appointment"));
        }
        Ok(appointment)
    }

    /// Appointments matching the filter, sorted by start time.
    pub fn list(&self, filter: AppointmentFilter) -> Vec<Appointment> {
        let mut out: Vec<Appointment> = self
            .appointments
            .iter()
            .filter(|a| filter.practitioner_id.is_none_or(|p| a.practitioner_id == p))
            .filter(|a| filter.patient_id.is_none_or(|p| a.patient_id == p))
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .map(|a| a.clone())
            .collect();
        out.sort_by_key(|a| a.start);
        out
    }

    fn get_unchecked(&self, id: Uuid) -> Result<Appointment> {
        self.appointments
            .get(&id)
            .map(|a| a.clone())
            .ok_or_else(|| CoreError::not_found("Appointment", id.to_string()))
    }

    /// A patient may not hold two active appointments over the same range,
    /// with any practitioner. Best-effort: the linearizable guarantee of the
    /// system remains per-practitioner slot exclusivity in the engine.
    fn ensure_patient_free(
        &self,
        patient_id: Uuid,
        range: &TimeRange,
        exclude: Option<Uuid>,
    ) -> Result<()> {
        let clash = self.appointments.iter().any(|a| {
            a.patient_id == patient_id
                && Some(a.id) != exclude
                && a.status.is_active()
                && a.range().overlaps(range)
        });
        if clash {
            return Err(CoreError::conflict(
                "patient already has an appointment in this range",
            ));
        }
        Ok(())
    }

    /// Apply a status-only transition under the record's exclusive guard.
    fn transition(
        &self,
        id: Uuid,
        operation: &str,
        next: impl Fn(AppointmentStatus) -> Option<AppointmentStatus>,
    ) -> Result<Appointment> {
        self.transition_with(id, operation, |appt| next(appt.status))
    }

    /// Apply a transition that may also touch timing fields. The closure runs
    /// under the map entry's guard and returns the new status, or `None` when
    /// the operation is not legal from the current status.
    fn transition_with(
        &self,
        id: Uuid,
        operation: &str,
        apply: impl FnOnce(&mut Appointment) -> Option<AppointmentStatus>,
    ) -> Result<Appointment> {
        let mut entry = self
            .appointments
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("Appointment", id.to_string()))?;
        let before = entry.status;
        let Some(new_status) = apply(&mut entry) else {
            return Err(CoreError::invalid_transition(operation, before.as_str()));
        };
        entry.status = new_status;
        entry.touch();
        let updated = entry.clone();
        drop(entry);

        tracing::info!(
            appointment_id = %id,
            from = %before,
            to = %new_status,
            "appointment transition"
        );
        self.events.send(SchedulingEvent::AppointmentChanged {
            id,
            new_status,
        });
        Ok(updated)
    }
}
