use thiserror::Error;

/// Core error types for MedSched scheduling operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Time range unavailable: {0}")]
    Conflict(String),

    #[error("Not permitted: {0}")]
    Authorization(String),

    #[error("Invalid transition: {operation} is not legal from status {status}")]
    InvalidTransition { operation: String, status: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Time parsing error: {0}")]
    TimeError(#[from] time::error::Parse),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Create a new Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create a new Authorization error
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    /// Create a new InvalidTransition error
    pub fn invalid_transition(operation: impl Into<String>, status: impl Into<String>) -> Self {
        Self::InvalidTransition {
            operation: operation.into(),
            status: status.into(),
        }
    }

    /// Create a new NotFound error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Conflict(_)
                | Self::Authorization(_)
                | Self::InvalidTransition { .. }
                | Self::NotFound { .. }
                | Self::JsonError(_)
        )
    }

    /// Check if this error is a server error (5xx category)
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::TimeError(_) | Self::UuidError(_)
        )
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Conflict(_) => ErrorCategory::Conflict,
            Self::Authorization(_) => ErrorCategory::Authorization,
            Self::InvalidTransition { .. } => ErrorCategory::InvalidTransition,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::JsonError(_) => ErrorCategory::Serialization,
            Self::TimeError(_) | Self::UuidError(_) => ErrorCategory::System,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    Authorization,
    InvalidTransition,
    NotFound,
    Serialization,
    System,
    Configuration,
}

impl ErrorCategory {
    /// Stable identifier used in error payloads and log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::Authorization => "authorization",
            Self::InvalidTransition => "invalid_transition",
            Self::NotFound => "not_found",
            Self::Serialization => "serialization",
            Self::System => "system",
            Self::Configuration => "configuration",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = CoreError::validation("duration must be between 15 and 240 minutes");
        assert_eq!(
            err.to_string(),
            "Validation failed: duration must be between 15 and 240 minutes"
        );
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_conflict_error() {
        let err = CoreError::conflict("slot already reserved");
        assert_eq!(err.to_string(), "Time range unavailable: slot already reserved");
        assert!(err.is_client_error());
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = CoreError::invalid_transition("confirm", "CANCELLED");
        assert_eq!(
            err.to_string(),
            "Invalid transition: confirm is not legal from status CANCELLED"
        );
        assert_eq!(err.category(), ErrorCategory::InvalidTransition);
    }

    #[test]
    fn test_not_found_error() {
        let err = CoreError::not_found("Appointment", "123");
        assert_eq!(err.to_string(), "Appointment not found: 123");
        assert!(err.is_client_error());
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_configuration_error() {
        let err = CoreError::configuration("server.port must be > 0");
        assert!(err.is_server_error());
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_error_categories_display() {
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::Conflict.to_string(), "conflict");
        assert_eq!(ErrorCategory::Authorization.to_string(), "authorization");
        assert_eq!(
            ErrorCategory::InvalidTransition.to_string(),
            "invalid_transition"
        );
        assert_eq!(ErrorCategory::NotFound.to_string(), "not_found");
    }
}
