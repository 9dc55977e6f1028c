//! End-to-end tests of the scheduling core: slot pool, booking lifecycle,
//! authorization and the contested-slot race.

use std::sync::Arc;

use medsched_auth::AuthContext;
use medsched_core::{AppointmentStatus, CoreError, EventBroadcaster, Role, SchedulingEvent, TimeRange};
use medsched_scheduling::{AppointmentFilter, AppointmentStateMachine, AvailabilityEngine};
use time::macros::datetime;
use uuid::Uuid;

struct Fixture {
    engine: Arc<AvailabilityEngine>,
    machine: Arc<AppointmentStateMachine>,
    events: Arc<EventBroadcaster>,
    practitioner: AuthContext,
    patient: AuthContext,
}

fn fixture() -> Fixture {
    let events = EventBroadcaster::new_shared();
    let engine = AvailabilityEngine::new_shared(events.clone());
    let machine = AppointmentStateMachine::new_shared(engine.clone(), events.clone());
    Fixture {
        engine,
        machine,
        events,
        practitioner: AuthContext::new(Uuid::new_v4(), Role::Practitioner),
        patient: AuthContext::new(Uuid::new_v4(), Role::Patient),
    }
}

fn at(h: u8, m: u8) -> time::OffsetDateTime {
    datetime!(2030-06-03 00:00 UTC).replace_time(time::Time::from_hms(h, m, 0).unwrap())
}

fn range(sh: u8, sm: u8, eh: u8, em: u8) -> TimeRange {
    TimeRange::new(at(sh, sm), at(eh, em))
}

#[test]
fn booked_slot_leaves_the_pool() {
    let f = fixture();
    let px = f.practitioner.person_id;
    f.engine.publish(px, at(10, 0), 30).unwrap();

    let appt = f
        .machine
        .book(&f.patient, f.patient.person_id, px, range(10, 0, 10, 30), None)
        .unwrap();

    assert_eq!(appt.status, AppointmentStatus::Scheduled);
    assert!(f.engine.list_available(px).is_empty());
}

#[test]
fn practitioner_confirms_scheduled_appointment() {
    let f = fixture();
    let px = f.practitioner.person_id;
    f.engine.publish(px, at(10, 0), 30).unwrap();
    let appt = f
        .machine
        .book(&f.patient, f.patient.person_id, px, range(10, 0, 10, 30), None)
        .unwrap();

    let confirmed = f.machine.confirm(&f.practitioner, appt.id).unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
}

#[test]
fn cancelling_reinstates_the_vacated_range() {
    let f = fixture();
    let px = f.practitioner.person_id;
    f.engine.publish(px, at(10, 0), 30).unwrap();
    let appt = f
        .machine
        .book(&f.patient, f.patient.person_id, px, range(10, 0, 10, 30), None)
        .unwrap();
    f.machine.confirm(&f.practitioner, appt.id).unwrap();

    let cancelled = f.machine.cancel(&f.practitioner, appt.id).unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    let slots = f.engine.list_available(px);
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, at(10, 0));

    // Repeating the cancel is rejected, and the pool stays intact
    assert!(matches!(
        f.machine.cancel(&f.practitioner, appt.id).unwrap_err(),
        CoreError::InvalidTransition { .. }
    ));
    assert_eq!(f.engine.list_available(px).len(), 1);
}

#[test]
fn reschedule_moves_booking_and_swaps_ranges() {
    let f = fixture();
    let px = f.practitioner.person_id;
    f.engine.publish(px, at(10, 0), 30).unwrap();
    f.engine.publish(px, at(14, 0), 30).unwrap();
    let appt = f
        .machine
        .book(&f.patient, f.patient.person_id, px, range(10, 0, 10, 30), None)
        .unwrap();
    f.machine.confirm(&f.practitioner, appt.id).unwrap();

    let moved = f
        .machine
        .reschedule(&f.patient, appt.id, range(14, 0, 14, 30))
        .unwrap();
    assert_eq!(moved.status, AppointmentStatus::Rescheduled);
    assert_eq!(moved.start, at(14, 0));

    let starts: Vec<_> = f.engine.list_available(px).iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![at(10, 0)]);
}

#[test]
fn reschedule_failure_leaves_booking_intact() {
    let f = fixture();
    let px = f.practitioner.person_id;
    f.engine.publish(px, at(10, 0), 30).unwrap();
    let appt = f
        .machine
        .book(&f.patient, f.patient.person_id, px, range(10, 0, 10, 30), None)
        .unwrap();

    // No open slot at 16:00, so the reservation fails
    let err = f
        .machine
        .reschedule(&f.patient, appt.id, range(16, 0, 16, 30))
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));

    let unchanged = f.machine.get(&f.patient, appt.id).unwrap();
    assert_eq!(unchanged.start, at(10, 0));
    assert_eq!(unchanged.status, AppointmentStatus::Scheduled);
}

#[test]
fn second_booking_of_consumed_slot_conflicts() {
    let f = fixture();
    let px = f.practitioner.person_id;
    f.engine.publish(px, at(10, 0), 30).unwrap();
    f.machine
        .book(&f.patient, f.patient.person_id, px, range(10, 0, 10, 30), None)
        .unwrap();

    let second_patient = AuthContext::new(Uuid::new_v4(), Role::Patient);
    let err = f
        .machine
        .book(
            &second_patient,
            second_patient.person_id,
            px,
            range(10, 0, 10, 30),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
    assert_eq!(f.machine.list(AppointmentFilter::default()).len(), 1);
}

#[test]
fn concurrent_bookings_have_exactly_one_winner() {
    let f = fixture();
    let px = f.practitioner.person_id;
    f.engine.publish(px, at(10, 0), 30).unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let machine = f.machine.clone();
        let patient = AuthContext::new(Uuid::new_v4(), Role::Patient);
        handles.push(std::thread::spawn(move || {
            machine
                .book(&patient, patient.person_id, px, range(10, 0, 10, 30), None)
                .is_ok()
        }));
    }
    let wins = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(wins, 1);
    assert_eq!(f.machine.list(AppointmentFilter::default()).len(), 1);
}

#[test]
fn racing_reschedules_conserve_calendar_capacity() {
    // Both actors may legally move the same booking; whichever transition
    // lands second must release the first one's range, not the original.
    for _ in 0..50 {
        let f = fixture();
        let px = f.practitioner.person_id;
        f.engine.publish(px, at(10, 0), 30).unwrap();
        f.engine.publish(px, at(14, 0), 30).unwrap();
        f.engine.publish(px, at(15, 0), 30).unwrap();
        let appt = f
            .machine
            .book(&f.patient, f.patient.person_id, px, range(10, 0, 10, 30), None)
            .unwrap();

        let barrier = Arc::new(std::sync::Barrier::new(2));
        let to_a = {
            let machine = f.machine.clone();
            let patient = f.patient;
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                machine.reschedule(&patient, appt.id, range(14, 0, 14, 30))
            })
        };
        let to_b = {
            let machine = f.machine.clone();
            let practitioner = f.practitioner;
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                machine.reschedule(&practitioner, appt.id, range(15, 0, 15, 30))
            })
        };
        to_a.join().unwrap().unwrap();
        to_b.join().unwrap().unwrap();

        // Three published ranges, one held by the appointment: two open
        let current = f.machine.get(&f.patient, appt.id).unwrap();
        let open = f.engine.list_available(px);
        assert_eq!(open.len(), 2, "a vacated range leaked from the pool");
        assert!(
            open.iter().all(|s| s.start != current.start),
            "the appointment's range must not be open"
        );
    }
}

#[test]
fn invalid_transitions_fail_deterministically() {
    let f = fixture();
    let px = f.practitioner.person_id;
    f.engine.publish(px, at(10, 0), 30).unwrap();
    let appt = f
        .machine
        .book(&f.patient, f.patient.person_id, px, range(10, 0, 10, 30), None)
        .unwrap();
    f.machine.cancel(&f.patient, appt.id).unwrap();

    // Confirming a cancelled appointment
    assert!(matches!(
        f.machine.confirm(&f.practitioner, appt.id).unwrap_err(),
        CoreError::InvalidTransition { .. }
    ));
    // Rescheduling a cancelled appointment
    f.engine.publish(px, at(14, 0), 30).unwrap();
    assert!(matches!(
        f.machine
            .reschedule(&f.patient, appt.id, range(14, 0, 14, 30))
            .unwrap_err(),
        CoreError::InvalidTransition { .. }
    ));
}

#[test]
fn authorization_failures() {
    let f = fixture();
    let px = f.practitioner.person_id;
    f.engine.publish(px, at(10, 0), 30).unwrap();
    let appt = f
        .machine
        .book(&f.patient, f.patient.person_id, px, range(10, 0, 10, 30), None)
        .unwrap();

    // A patient cannot confirm
    assert!(matches!(
        f.machine.confirm(&f.patient, appt.id).unwrap_err(),
        CoreError::Authorization(_)
    ));
    // A stranger cannot cancel
    let stranger = AuthContext::new(Uuid::new_v4(), Role::Patient);
    assert!(matches!(
        f.machine.cancel(&stranger, appt.id).unwrap_err(),
        CoreError::Authorization(_)
    ));
    // An admin can read but not mutate
    let admin = AuthContext::new(Uuid::new_v4(), Role::Admin);
    assert!(f.machine.get(&admin, appt.id).is_ok());
    assert!(matches!(
        f.machine.cancel(&admin, appt.id).unwrap_err(),
        CoreError::Authorization(_)
    ));
    // A patient cannot book for somebody else
    assert!(matches!(
        f.machine
            .book(&stranger, f.patient.person_id, px, range(11, 0, 11, 30), None)
            .unwrap_err(),
        CoreError::Authorization(_)
    ));
}

#[test]
fn patient_cannot_double_book_across_practitioners() {
    let f = fixture();
    let px = f.practitioner.person_id;
    let other_px = Uuid::new_v4();
    f.engine.publish(px, at(10, 0), 30).unwrap();
    f.engine.publish(other_px, at(10, 15), 30).unwrap();

    f.machine
        .book(&f.patient, f.patient.person_id, px, range(10, 0, 10, 30), None)
        .unwrap();
    let err = f
        .machine
        .book(
            &f.patient,
            f.patient.person_id,
            other_px,
            range(10, 15, 10, 45),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[test]
fn complete_requires_confirmed() {
    let f = fixture();
    let px = f.practitioner.person_id;
    f.engine.publish(px, at(10, 0), 30).unwrap();
    let appt = f
        .machine
        .book(&f.patient, f.patient.person_id, px, range(10, 0, 10, 30), None)
        .unwrap();

    assert!(matches!(
        f.machine.complete(appt.id).unwrap_err(),
        CoreError::InvalidTransition { .. }
    ));
    f.machine.confirm(&f.practitioner, appt.id).unwrap();
    let done = f.machine.complete(appt.id).unwrap();
    assert_eq!(done.status, AppointmentStatus::Completed);
    // Terminal: nothing else applies
    assert!(f.machine.cancel(&f.patient, appt.id).is_err());
}

#[tokio::test]
async fn transitions_emit_events() {
    let f = fixture();
    let px = f.practitioner.person_id;
    let mut rx = f.events.subscribe();

    f.engine.publish(px, at(10, 0), 30).unwrap();
    let appt = f
        .machine
        .book(&f.patient, f.patient.person_id, px, range(10, 0, 10, 30), None)
        .unwrap();

    let mut kinds = Vec::new();
    for _ in 0..3 {
        kinds.push(rx.recv().await.unwrap().event.kind().to_string());
    }
    assert_eq!(kinds, vec!["slot_published", "slot_consumed", "appointment_changed"]);

    f.machine.confirm(&f.practitioner, appt.id).unwrap();
    match rx.recv().await.unwrap().event {
        SchedulingEvent::AppointmentChanged { id, new_status } => {
            assert_eq!(id, appt.id);
            assert_eq!(new_status, AppointmentStatus::Confirmed);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
