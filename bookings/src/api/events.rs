//! Live booking updates as server-sent events.
//!
//! - GET /api/bookings/events - Every booking notification
//! - GET /api/bookings/events?booking_id=... - Notifications for one booking
//!
//! Event names are `booking_created`, `booking_status_changed` and
//! `booking_cancelled`; the data is the notification as JSON.

use crate::server::AppState;
use axum::extract::{Query, State, rejection::QueryRejection};
use axum::response::sse::{Event, KeepAlive, Sse};
use broom_fairy_web::WebResult;
use futures::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use uuid::Uuid;

/// Optional stream filter
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Only notifications about this booking
    pub booking_id: Option<Uuid>,
}

/// Stream booking notifications.
///
/// Subscribers that fall behind skip the notifications they missed.
///
/// # Errors
///
/// 400 for a malformed filter.
pub async fn booking_events(
    State(state): State<AppState>,
    query: Result<Query<EventsQuery>, QueryRejection>,
) -> WebResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let Query(query) = query?;
    let receiver = state.notifier.subscribe();
    tracing::debug!(booking_id = ?query.booking_id, "Booking event stream opened");

    let stream = BroadcastStream::new(receiver).filter_map(move |result| {
        let notification = match result {
            Ok(notification) => notification,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Booking event stream lagged");
                return None;
            },
        };

        if query
            .booking_id
            .is_some_and(|id| id != *notification.booking_id.as_uuid())
        {
            return None;
        }

        match Event::default()
            .event(notification.event_name())
            .json_data(&notification)
        {
            Ok(event) => Some(Ok(event)),
            Err(error) => {
                tracing::warn!(error = %error, "Failed to encode booking event");
                None
            },
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
