//! Router configuration for the booking server.

use super::state::AppState;
use crate::api::{bookings, events, services};
use axum::{
    Router,
    routing::{get, post},
};
use broom_fairy_web::correlation_id_layer;
use broom_fairy_web::handlers::health_check;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// All routes live under `/api`. Layers, outermost first: correlation id,
/// HTTP tracing, permissive CORS.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        // Service catalog
        .route("/services", get(services::list_services).post(services::create_service))
        .route("/services/:id", get(services::get_service))
        // Bookings
        .route("/bookings", get(bookings::list_bookings).post(bookings::create_booking))
        .route("/bookings/events", get(events::booking_events))
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/status", post(bookings::change_status))
        .route("/bookings/:id/cancellation", get(bookings::quote_cancellation))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
}
