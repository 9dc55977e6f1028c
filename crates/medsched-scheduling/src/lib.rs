//! Scheduling core for MedSched: slot allocation and the appointment
//! lifecycle.
//!
//! Two components with a strict ownership split:
//!
//! - [`AvailabilityEngine`] owns which (practitioner, time-range) pairs are
//!   currently free and provides linearizable reservation.
//! - [`AppointmentStateMachine`] owns appointment records and their status
//!   lifecycle, delegating all time exclusivity to the engine.

mod availability;
mod lifecycle;

pub use availability::{AvailabilityEngine, MAX_SLOT_MINUTES, MIN_SLOT_MINUTES};
pub use lifecycle::{AppointmentFilter, AppointmentStateMachine};
