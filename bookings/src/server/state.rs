//! Application state for the booking HTTP server.

use crate::notifier::BroadcastNotifier;
use crate::service::BookingService;
use axum::extract::FromRef;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Booking and catalog operations
    pub service: Arc<BookingService>,

    /// Source of the live booking-update stream
    pub notifier: Arc<BroadcastNotifier>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(service: Arc<BookingService>, notifier: Arc<BroadcastNotifier>) -> Self {
        Self { service, notifier }
    }
}

impl FromRef<AppState> for Arc<BookingService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.service)
    }
}

impl FromRef<AppState> for Arc<BroadcastNotifier> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.notifier)
    }
}
