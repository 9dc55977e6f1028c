use axum::extract::State;
use axum::http::{Method, Request, StatusCode, header::AUTHORIZATION};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Json, body::Body};
use medsched_auth::AuthContext;
use serde_json::json;

use crate::state::AppState;

/// Authentication middleware: validates Bearer tokens and injects
/// [`AuthContext`] into request extensions for downstream handlers.
///
/// Public endpoints (health, login, practitioner/slot listings) skip
/// authentication entirely. Missing or invalid tokens on protected routes
/// yield 401 with a JSON error body.
pub async fn authentication(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if should_skip_authentication(req.method(), req.uri().path()) {
        return next.run(req).await;
    }

    let Some(auth_header) = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        tracing::debug!(path = %req.uri().path(), "no Authorization header");
        return unauthorized("Authentication required");
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(t) if !t.is_empty() => t,
        _ => return unauthorized("Invalid Authorization header format"),
    };

    match state.identity.identity(token) {
        Ok(person) => {
            let context = AuthContext::from(&person);
            tracing::debug!(person_id = %context.person_id, role = %context.role, "token validated");
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "token validation failed");
            unauthorized("Invalid or expired token")
        }
    }
}

/// Routes reachable without a session.
fn should_skip_authentication(method: &Method, path: &str) -> bool {
    if method == Method::GET {
        if matches!(path, "/" | "/healthz" | "/readyz" | "/practitioners") {
            return true;
        }
        // GET /practitioners/{id}/slots is the public availability listing
        if path.starts_with("/practitioners/") && path.ends_with("/slots") {
            return true;
        }
    }
    method == Method::POST && path == "/auth/login"
}

fn unauthorized(message: &str) -> Response {
    let body = json!({
        "error": {
            "code": "unauthenticated",
            "message": message,
        }
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
