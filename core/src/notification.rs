//! Notifications published after a booking change has been saved.

use crate::status::BookingStatus;
use crate::types::{Booking, BookingId, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to the booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A booking was requested
    Created,
    /// A booking moved to a new status
    StatusChanged,
    /// A booking was cancelled
    Cancelled,
}

/// Booking update delivered to subscribers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingNotification {
    /// What happened
    pub kind: NotificationKind,
    /// Booking concerned
    pub booking_id: BookingId,
    /// Status after the change
    pub status: BookingStatus,
    /// Fee charged, for cancellations
    pub fee_charged: Option<Money>,
    /// When the change happened
    pub occurred_at: DateTime<Utc>,
}

impl BookingNotification {
    /// Notification describing the current state of `booking`
    #[must_use]
    pub fn for_booking(kind: NotificationKind, booking: &Booking) -> Self {
        Self {
            kind,
            booking_id: booking.id,
            status: booking.status,
            fee_charged: booking.fee_charged(),
            occurred_at: booking.updated_at,
        }
    }

    /// Server-sent event name for this notification
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self.kind {
            NotificationKind::Created => "booking_created",
            NotificationKind::StatusChanged => "booking_status_changed",
            NotificationKind::Cancelled => "booking_cancelled",
        }
    }
}
