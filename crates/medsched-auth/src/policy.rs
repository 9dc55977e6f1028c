//! Role authorization policy.
//!
//! A single pure decision function consulted by the state machine, the
//! availability engine and the HTTP handlers, replacing scattered role
//! branching at call sites.

use medsched_core::{Appointment, Role};
use uuid::Uuid;

use crate::context::AuthContext;

/// A scheduling action subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Book an appointment for the given patient.
    Book { patient_id: Uuid },
    /// Confirm an appointment (target required).
    Confirm,
    /// Cancel an appointment (target required).
    Cancel,
    /// Reschedule an appointment (target required).
    Reschedule,
    /// Read a single appointment (target required).
    ViewAppointment,
    /// Publish or block slots on the given practitioner's calendar.
    PublishSlot { practitioner_id: Uuid },
    /// Create person records or list all patients.
    ManageDirectory,
}

/// Decide whether `actor` may perform `action` on `target`.
///
/// Admin holds read-only visibility over appointments and full directory
/// management, but no mutation rights over appointment status. That is
/// deliberate least-privilege, not a missing rule.
pub fn permit(action: Action, actor: &AuthContext, target: Option<&Appointment>) -> bool {
    match action {
        Action::Book { patient_id } => {
            actor.role == Role::Patient && actor.person_id == patient_id
        }
        Action::Confirm => target.is_some_and(|appt| {
            actor.role == Role::Practitioner && actor.person_id == appt.practitioner_id
        }),
        Action::Cancel | Action::Reschedule => target.is_some_and(|appt| {
            (actor.role == Role::Patient && actor.person_id == appt.patient_id)
                || (actor.role == Role::Practitioner && actor.person_id == appt.practitioner_id)
        }),
        Action::ViewAppointment => match actor.role {
            Role::Admin => true,
            Role::Patient => target.is_some_and(|appt| appt.patient_id == actor.person_id),
            Role::Practitioner => {
                target.is_some_and(|appt| appt.practitioner_id == actor.person_id)
            }
        },
        Action::PublishSlot { practitioner_id } => {
            actor.role == Role::Admin
                || (actor.role == Role::Practitioner && actor.person_id == practitioner_id)
        }
        Action::ManageDirectory => actor.role == Role::Admin,
    }
}
