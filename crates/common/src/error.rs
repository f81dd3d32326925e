//! Error types for votehall.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Candidate not found: {0}")]
    CandidateNotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The voter identity already has a vote for this candidate.
    /// Expected and frequent; not an error condition for metrics.
    #[error("Already voted for this candidate")]
    AlreadyVoted,

    #[error("Voting has not started for this candidate yet")]
    TimerNotRunning,

    #[error("Voting time has ended for this candidate")]
    TimerExpired,

    /// A connection ceiling was reached.
    #[error("Too many live connections")]
    Overloaded,

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::EventNotFound(_) | Self::CandidateNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::InvalidState(_)
            | Self::BadRequest(_)
            | Self::Validation(_)
            | Self::TimerNotRunning
            | Self::TimerExpired => StatusCode::BAD_REQUEST,
            Self::Conflict(_) | Self::AlreadyVoted => StatusCode::CONFLICT,
            Self::Overloaded => StatusCode::SERVICE_UNAVAILABLE,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::EventNotFound(_) => "EVENT_NOT_FOUND",
            Self::CandidateNotFound(_) => "CANDIDATE_NOT_FOUND",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::AlreadyVoted => "ALREADY_VOTED",
            Self::TimerNotRunning => "TIMER_NOT_RUNNING",
            Self::TimerExpired => "TIMER_EXPIRED",
            Self::Overloaded => "OVERLOADED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Whether a retry may succeed without the caller changing anything.
    ///
    /// Only transient store failures qualify; everything else requires a
    /// state change or a corrected request first.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Overloaded)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::EventNotFound("e1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::AlreadyVoted.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::TimerExpired.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Overloaded.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_codes_stable() {
        assert_eq!(AppError::AlreadyVoted.error_code(), "ALREADY_VOTED");
        assert_eq!(AppError::TimerNotRunning.error_code(), "TIMER_NOT_RUNNING");
        assert_eq!(AppError::TimerExpired.error_code(), "TIMER_EXPIRED");
        assert_eq!(AppError::Overloaded.error_code(), "OVERLOADED");
    }

    #[test]
    fn test_retryable() {
        assert!(AppError::Database("down".into()).is_retryable());
        assert!(!AppError::AlreadyVoted.is_retryable());
        assert!(!AppError::InvalidState("pending".into()).is_retryable());
    }
}
