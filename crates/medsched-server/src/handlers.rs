use axum::extract::{Extension, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::IntoResponse;
use axum::Json;
use medsched_auth::{Action, AuthContext, hash_password, permit};
use medsched_core::{
    Appointment, AppointmentStatus, CoreError, Person, Role, Slot, TimeRange,
};
use medsched_directory::NewPerson;
use medsched_scheduling::AppointmentFilter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;

// ---- Health and info ----

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "MedSched Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

// ---- Authentication ----

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub identity: Person,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    match state.identity.login(&payload.email, &payload.password) {
        Ok(session) => (
            StatusCode::OK,
            Json(json!(LoginResponse {
                token: session.token,
                identity: session.person,
            })),
        ),
        // Credential failures are 401, unlike in-session authorization errors
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": { "code": "unauthenticated", "message": "invalid credentials" }
            })),
        ),
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        state.identity.logout(token);
    }
    StatusCode::NO_CONTENT
}

pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
) -> ApiResult<Json<Person>> {
    Ok(Json(state.directory.get(actor.person_id)?))
}

// ---- Directory ----

#[derive(Debug, Deserialize)]
pub struct PractitionerQuery {
    pub specialty: Option<String>,
}

pub async fn list_practitioners(
    State(state): State<AppState>,
    Query(query): Query<PractitionerQuery>,
) -> Json<Vec<Person>> {
    Json(state.directory.list_practitioners(query.specialty.as_deref()))
}

#[derive(Debug, Deserialize)]
pub struct CreatePersonRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub password: String,
}

pub async fn create_practitioner(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Json(payload): Json<CreatePersonRequest>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    create_person(&state, &actor, payload, Role::Practitioner)
}

pub async fn list_patients(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Person>>> {
    if !permit(Action::ManageDirectory, &actor, None) {
        return Err(CoreError::authorization("administrators only").into());
    }
    Ok(Json(state.directory.list_patients()))
}

pub async fn create_patient(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Json(payload): Json<CreatePersonRequest>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    create_person(&state, &actor, payload, Role::Patient)
}

fn create_person(
    state: &AppState,
    actor: &AuthContext,
    payload: CreatePersonRequest,
    role: Role,
) -> ApiResult<(StatusCode, Json<Person>)> {
    if !permit(Action::ManageDirectory, actor, None) {
        return Err(CoreError::authorization("administrators only").into());
    }
    if payload.password.len() < 6 {
        return Err(CoreError::validation("password must be at least 6 characters").into());
    }
    let person = state.directory.create(NewPerson {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        role,
        specialties: payload.specialties,
        password_hash: hash_password(&payload.password)?,
    })?;
    Ok((StatusCode::CREATED, Json(person)))
}

// ---- Slots ----

pub async fn list_slots(
    State(state): State<AppState>,
    Path(practitioner_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Slot>>> {
    state.directory.get_practitioner(practitioner_id)?;
    Ok(Json(state.availability.list_available(practitioner_id)))
}

#[derive(Debug, Deserialize)]
pub struct PublishSlotRequest {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    pub duration_minutes: i64,
    /// Block the range (lunch break, leave) instead of opening it.
    #[serde(default)]
    pub blocked: bool,
}

pub async fn publish_slot(
    State(state): State<AppState>,
    Path(practitioner_id): Path<Uuid>,
    Extension(actor): Extension<AuthContext>,
    Json(payload): Json<PublishSlotRequest>,
) -> ApiResult<(StatusCode, Json<Slot>)> {
    if !permit(Action::PublishSlot { practitioner_id }, &actor, None) {
        return Err(CoreError::authorization("no permission to edit this calendar").into());
    }
    state.directory.get_practitioner(practitioner_id)?;

    let slot = if payload.blocked {
        // Blocked ranges bypass the engine's slot-duration bounds but still
        // need sane limits before the duration arithmetic.
        if !(1..=24 * 60).contains(&payload.duration_minutes) {
            return Err(CoreError::validation(
                "blocked duration must be between 1 minute and 24 hours",
            )
            .into());
        }
        if payload.start < medsched_core::now_utc() {
            return Err(CoreError::validation("blocked range starts in the past").into());
        }
        let range = TimeRange::new(
            payload.start,
            payload.start + time::Duration::minutes(payload.duration_minutes),
        );
        state.availability.block(practitioner_id, range)?;
        Slot::blocked(range.start, range.end)
    } else {
        state
            .availability
            .publish(practitioner_id, payload.start, payload.duration_minutes)?
    };
    Ok((StatusCode::CREATED, Json(slot)))
}

// ---- Appointments ----

#[derive(Debug, Deserialize)]
pub struct AppointmentQuery {
    pub practitioner_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Query(query): Query<AppointmentQuery>,
) -> Json<Vec<Appointment>> {
    // Role scoping: patients and practitioners only ever see their own,
    // whatever the query says; admins see everything.
    let mut filter = AppointmentFilter {
        practitioner_id: query.practitioner_id,
        patient_id: query.patient_id,
        status: query.status,
    };
    match actor.role {
        Role::Patient => filter.patient_id = Some(actor.person_id),
        Role::Practitioner => filter.practitioner_id = Some(actor.person_id),
        Role::Admin => {}
    }
    Json(state.appointments.list(filter))
}

#[derive(Debug, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub practitioner_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

pub async fn book_appointment(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Json(payload): Json<BookAppointmentRequest>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    state.directory.get_patient(payload.patient_id)?;
    let practitioner = state.directory.get_practitioner(payload.practitioner_id)?;

    let appointment = state.appointments.book(
        &actor,
        payload.patient_id,
        payload.practitioner_id,
        TimeRange::new(payload.start, payload.end),
        practitioner.specialties.first().cloned(),
    )?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn confirm_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(actor): Extension<AuthContext>,
) -> ApiResult<Json<Appointment>> {
    Ok(Json(state.appointments.confirm(&actor, id)?))
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(actor): Extension<AuthContext>,
) -> ApiResult<Json<Appointment>> {
    Ok(Json(state.appointments.cancel(&actor, id)?))
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    #[serde(with = "time::serde::rfc3339")]
    pub new_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub new_end: OffsetDateTime,
}

pub async fn reschedule_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(actor): Extension<AuthContext>,
    Json(payload): Json<RescheduleRequest>,
) -> ApiResult<Json<Appointment>> {
    let moved = state.appointments.reschedule(
        &actor,
        id,
        TimeRange::new(payload.new_start, payload.new_end),
    )?;
    Ok(Json(moved))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(actor): Extension<AuthContext>,
) -> ApiResult<Json<Appointment>> {
    Ok(Json(state.appointments.get(&actor, id)?))
}
