//! Booking API endpoints.
//!
//! - POST /api/bookings - Book a catalog service
//! - GET /api/bookings - List bookings (`client_id`, `expert_id`, `status`)
//! - GET /api/bookings/:id - Get one booking
//! - POST /api/bookings/:id/status - Move a booking along its lifecycle
//! - GET /api/bookings/:id/cancellation - Quote the cancellation fee
//! - POST /api/bookings/:id/cancel - Cancel a booking
//!
//! # Lifecycle
//!
//! ```text
//! pending → confirmed → in_progress → completed
//!    ↓          ↓            ↓            ↑
//! cancelled  cancelled    disputed ───────┘
//!                            ↓
//!                        cancelled
//! ```

use crate::server::AppState;
use crate::service::NewBooking;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use broom_fairy_core::policy::CancellationDecision;
use broom_fairy_core::repository::BookingFilter;
use broom_fairy_core::status::BookingStatus;
use broom_fairy_core::types::{Booking, BookingId, Money};
use broom_fairy_web::{ApiResponse, AppError, WebResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to change a booking's status.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    /// Target status (snake_case)
    pub status: BookingStatus,
}

/// Request to cancel a booking.
#[derive(Debug, Default, Deserialize)]
pub struct CancelBookingRequest {
    /// Optional cancellation reason
    #[serde(default)]
    pub reason: Option<String>,
}

/// Response after cancelling a booking.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingResponse {
    /// Booking cancelled
    pub booking_id: BookingId,
    /// Status after cancellation
    pub status: BookingStatus,
    /// Fee charged to the client (zero for free cancellations)
    pub fee_charged: Money,
    /// Whether the cancellation fell inside the fee window
    pub chargeable: bool,
    /// Hours that were left before the scheduled start
    pub hours_remaining: f64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Book a catalog service.
///
/// # Errors
///
/// 404 for an unknown service, 422 for an invalid request.
pub async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<NewBooking>, JsonRejection>,
) -> WebResult<(StatusCode, Json<ApiResponse<Booking>>)> {
    let Json(request) = payload?;
    let booking = state.service.create_booking(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(booking).with_message("Booking requested")),
    ))
}

/// List bookings, soonest first.
///
/// # Errors
///
/// 400 for malformed filters.
pub async fn list_bookings(
    State(state): State<AppState>,
    filter: Result<Query<BookingFilter>, QueryRejection>,
) -> WebResult<Json<ApiResponse<Vec<Booking>>>> {
    let Query(filter) = filter?;
    let bookings = state.service.list_bookings(filter).await?;
    Ok(Json(ApiResponse::ok(bookings)))
}

/// Get one booking.
///
/// # Errors
///
/// 404 if the booking does not exist.
pub async fn get_booking(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> WebResult<Json<ApiResponse<Booking>>> {
    let id = booking_id(id)?;
    let booking = state.service.get_booking(id).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// Move a booking to a new status.
///
/// Cancellation goes through [`cancel_booking`] so the fee is evaluated.
///
/// # Errors
///
/// 404, 409 for an illegal transition or a concurrent update, 422 for
/// `cancelled`.
pub async fn change_status(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ChangeStatusRequest>, JsonRejection>,
) -> WebResult<Json<ApiResponse<Booking>>> {
    let id = booking_id(id)?;
    let Json(request) = payload?;

    let booking = state.service.change_status(id, request.status).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// Quote the fee for cancelling now, without cancelling.
///
/// # Errors
///
/// 404, or 409 if the booking can no longer be cancelled.
pub async fn quote_cancellation(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> WebResult<Json<ApiResponse<CancellationDecision>>> {
    let id = booking_id(id)?;
    let quote = state.service.quote_cancellation(id).await?;
    Ok(Json(ApiResponse::ok(quote)))
}

/// Cancel a booking.
///
/// The body is optional; without a JSON content type the booking is
/// cancelled without a reason.
///
/// # Errors
///
/// 404, 409 if the booking is not cancellable or was updated concurrently.
pub async fn cancel_booking(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CancelBookingRequest>, JsonRejection>,
) -> WebResult<Json<ApiResponse<CancelBookingResponse>>> {
    let id = booking_id(id)?;
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => CancelBookingRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };

    let outcome = state.service.cancel_booking(id, request.reason).await?;

    let response = CancelBookingResponse {
        booking_id: outcome.booking.id,
        status: outcome.booking.status,
        fee_charged: outcome.decision.fee,
        chargeable: outcome.decision.chargeable,
        hours_remaining: outcome.decision.hours_remaining,
    };
    let message = if response.chargeable {
        "Booking cancelled; cancellation fee charged"
    } else {
        "Booking cancelled free of charge"
    };

    Ok(Json(ApiResponse::ok(response).with_message(message)))
}

fn booking_id(path: Result<Path<Uuid>, PathRejection>) -> Result<BookingId, AppError> {
    let Path(id) = path?;
    Ok(BookingId::from_uuid(id))
}
