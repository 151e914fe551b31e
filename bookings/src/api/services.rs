//! Service catalog endpoints.
//!
//! - GET /api/services - List the catalog
//! - POST /api/services - Add a service
//! - GET /api/services/:id - Get one service

use crate::server::AppState;
use crate::service::NewService;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use broom_fairy_core::types::{Service, ServiceId};
use broom_fairy_web::{ApiResponse, WebResult};
use uuid::Uuid;

/// List the catalog, by name.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn list_services(State(state): State<AppState>) -> WebResult<Json<ApiResponse<Vec<Service>>>> {
    let services = state.service.list_services().await?;
    Ok(Json(ApiResponse::ok(services)))
}

/// Get one service.
///
/// # Errors
///
/// 404 if the service does not exist.
pub async fn get_service(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> WebResult<Json<ApiResponse<Service>>> {
    let Path(id) = id?;
    let service = state.service.get_service(ServiceId::from_uuid(id)).await?;
    Ok(Json(ApiResponse::ok(service)))
}

/// Add a service.
///
/// # Errors
///
/// 422 for a blank name, zero duration or negative price.
pub async fn create_service(
    State(state): State<AppState>,
    payload: Result<Json<NewService>, JsonRejection>,
) -> WebResult<(StatusCode, Json<ApiResponse<Service>>)> {
    let Json(request) = payload?;
    let service = state.service.add_service(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(service))))
}
