//! Initial data: default admin plus, optionally, a demo calendar so a fresh
//! instance is immediately explorable.

use medsched_auth::{AuthContext, hash_password};
use medsched_core::{Person, Result, Role, TimeRange, now_utc};
use medsched_directory::NewPerson;
use time::Duration;

use crate::config::BootstrapConfig;
use crate::state::AppState;

pub fn bootstrap(state: &AppState, cfg: &BootstrapConfig) -> Result<()> {
    if !cfg.enabled {
        return Ok(());
    }
    if !state.directory.is_empty() {
        return Ok(());
    }

    state.directory.create(NewPerson {
        name: "Administrator".into(),
        email: cfg.admin_email.clone(),
        phone: None,
        role: Role::Admin,
        specialties: vec![],
        password_hash: hash_password(&cfg.admin_password)?,
    })?;
    tracing::info!(email = %cfg.admin_email, "bootstrap admin created");

    if cfg.seed_demo_data {
        seed_demo_data(state)?;
    }
    Ok(())
}

fn seed_demo_data(state: &AppState) -> Result<()> {
    let ana = demo_person(
        state,
        "Dr. Ana Cardoso",
        "ana@clinic.example",
        Role::Practitioner,
        vec!["Cardiology".into(), "General Practice".into()],
    )?;
    let bruno = demo_person(
        state,
        "Dr. Bruno Silva",
        "bruno@clinic.example",
        Role::Practitioner,
        vec!["Orthopedics".into()],
    )?;
    let joao = demo_person(state, "João da Silva", "joao@example.com", Role::Patient, vec![])?;
    demo_person(state, "Maria Oliveira", "maria@example.com", Role::Patient, vec![])?;

    // A handful of 30-minute slots starting tomorrow, plus a blocked lunch
    let base = (now_utc() + Duration::days(1)).replace_minute(0).unwrap_or(now_utc());
    for practitioner in [&ana, &bruno] {
        for offset in 1..6 {
            let start = base + Duration::hours(offset);
            if let Err(e) = state.availability.publish(practitioner.id, start, 30) {
                tracing::warn!(error = %e, "demo slot skipped");
            }
        }
        let lunch = base + Duration::hours(3) + Duration::minutes(30);
        let _ = state
            .availability
            .block(practitioner.id, TimeRange::new(lunch, lunch + Duration::minutes(30)));
    }

    // One example booking, already confirmed
    let range = TimeRange::new(base + Duration::hours(1), base + Duration::hours(1) + Duration::minutes(30));
    let patient = AuthContext::new(joao.id, Role::Patient);
    match state
        .appointments
        .book(&patient, joao.id, ana.id, range, ana.specialties.first().cloned())
    {
        Ok(appointment) => {
            let practitioner = AuthContext::new(ana.id, Role::Practitioner);
            if let Err(e) = state.appointments.confirm(&practitioner, appointment.id) {
                tracing::warn!(error = %e, "demo confirmation skipped");
            }
        }
        Err(e) => tracing::warn!(error = %e, "demo booking skipped"),
    }

    tracing::info!("demo data seeded");
    Ok(())
}

fn demo_person(
    state: &AppState,
    name: &str,
    email: &str,
    role: Role,
    specialties: Vec<String>,
) -> Result<Person> {
    state.directory.create(NewPerson {
        name: name.into(),
        email: email.into(),
        phone: None,
        role,
        specialties,
        // Demo accounts share a throwaway password
        password_hash: hash_password("welcome1")?,
    })
}
