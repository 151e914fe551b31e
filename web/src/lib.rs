//! Axum integration for the Broom Fairy booking core.
//!
//! The shell side of "Functional Core, Imperative Shell": everything here
//! translates between HTTP and the booking domain and never decides anything
//! about bookings itself.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← JSON envelopes, status codes
//! │  - AppError ← BookingError              │  ← correlation ids, tracing
//! ├─────────────────────────────────────────┤
//! │         Functional Core                 │
//! │  - status guard, cancellation policy    │  ← pure, no I/O
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use broom_fairy_web::{ApiResponse, WebResult};
//!
//! async fn get_booking(
//!     State(service): State<Arc<BookingService>>,
//!     Path(id): Path<Uuid>,
//! ) -> WebResult<Json<ApiResponse<Booking>>> {
//!     let booking = service.get_booking(BookingId::from_uuid(id)).await?;
//!     Ok(Json(ApiResponse::ok(booking)))
//! }
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;

// Re-export key types for convenience
pub use error::AppError;
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer};
pub use response::ApiResponse;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
