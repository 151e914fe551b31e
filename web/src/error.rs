//! Error types for web handlers.
//!
//! [`AppError`] bridges booking errors and HTTP responses. Every error is
//! rendered as the failure envelope
//! `{ "success": false, "error": <message>, "code": <CODE> }`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use broom_fairy_core::error::BookingError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<ApiResponse<Booking>>, AppError> {
///     let booking = service.get_booking(id).await?; // BookingError -> AppError
///     Ok(Json(ApiResponse::ok(booking)))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the machine-readable code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// HTTP status of the response
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            message.into(),
            "CONFLICT".to_string(),
        )
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Failure envelope (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Always `false`.
    success: bool,
    /// Human-readable error message.
    error: String,
    /// Error code (for client error handling).
    code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        } else {
            tracing::debug!(status = %self.status, code = %self.code, "Request rejected");
        }

        let body = ErrorResponse {
            success: false,
            error: self.message,
            code: self.code,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let code = err.code();
        match err {
            BookingError::NotFound(id) => Self::not_found("Booking", id),
            BookingError::ServiceNotFound(id) => Self::not_found("Service", id).with_code(code),
            BookingError::InvalidTransition { .. }
            | BookingError::VersionConflict { .. }
            | BookingError::AlreadyExists(_) => Self::conflict(err.to_string()).with_code(code),
            BookingError::Validation(message) => Self::validation(message),
            BookingError::Storage(_) => {
                Self::internal("An internal error occurred").with_source(anyhow::Error::new(err))
            },
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => Self::validation(err.body_text()),
            other => Self::bad_request(other.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use broom_fairy_core::status::BookingStatus;
    use broom_fairy_core::types::{BookingId, ServiceId, Version};

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn booking_not_found_is_404() {
        let id = BookingId::new();
        let err = AppError::from(BookingError::NotFound(id));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), format!("[NOT_FOUND] Booking with id {id} not found"));
    }

    #[test]
    fn service_not_found_keeps_its_code() {
        let err = AppError::from(BookingError::ServiceNotFound(ServiceId::new()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "SERVICE_NOT_FOUND");
    }

    #[test]
    fn transition_and_version_errors_are_conflicts() {
        let invalid = AppError::from(BookingError::InvalidTransition {
            current: BookingStatus::Pending,
            requested: BookingStatus::InProgress,
        });
        assert_eq!(invalid.status(), StatusCode::CONFLICT);
        assert_eq!(invalid.code(), "INVALID_TRANSITION");

        let stale = AppError::from(BookingError::VersionConflict {
            booking_id: BookingId::new(),
            expected: Version::new(1),
            actual: Version::new(2),
        });
        assert_eq!(stale.status(), StatusCode::CONFLICT);
        assert_eq!(stale.code(), "VERSION_CONFLICT");
    }

    #[test]
    fn validation_is_422() {
        let err = AppError::from(BookingError::Validation("start must be in the future".into()));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn body_is_failure_envelope() {
        let (status, body) = body_json(AppError::conflict("taken")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "taken");
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn storage_errors_hide_details() {
        let (status, body) =
            body_json(AppError::from(BookingError::Storage("connection refused".into()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }
}
