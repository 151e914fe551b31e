//! Health check endpoint.
//!
//! Liveness only: dependencies (database, notification channel) are not
//! probed.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process answers
    pub status: &'static str,
    /// Human-readable status line
    pub message: &'static str,
    /// Crate version
    pub version: &'static str,
}

/// Health check endpoint.
///
/// # Endpoint
///
/// ```text
/// GET /api/health
/// ```
///
/// # Response
///
/// ```json
/// { "status": "ok", "message": "Broom Fairy API running", "version": "0.1.0" }
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            message: "Broom Fairy API running",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let (status, Json(body)) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
