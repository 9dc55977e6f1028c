use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use medsched_core::{CoreError, ErrorCategory};
use serde_json::json;

/// Wraps a core error for the HTTP surface.
///
/// All domain errors are terminal for the triggering request; the status code
/// tells the client which ones are worth retrying with a different choice.
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.category() {
            ErrorCategory::Validation | ErrorCategory::Serialization => StatusCode::BAD_REQUEST,
            ErrorCategory::Authorization => StatusCode::FORBIDDEN,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
            ErrorCategory::InvalidTransition => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCategory::System | ErrorCategory::Configuration => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, category = %self.0.category(), "request rejected");
        }
        let body = json!({
            "error": {
                "code": self.0.category().code(),
                "message": self.0.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

/// Convenience result type for handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError(CoreError::validation("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(CoreError::conflict("x")).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError(CoreError::authorization("x")).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError(CoreError::invalid_transition("confirm", "CANCELLED")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError(CoreError::not_found("Appointment", "x")).status(),
            StatusCode::NOT_FOUND
        );
    }
}
