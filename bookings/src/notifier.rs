//! Broadcast notifier feeding the live booking-update stream.

use broom_fairy_core::environment::BookingNotifier;
use broom_fairy_core::notification::BookingNotification;
use tokio::sync::broadcast;

/// Notifier backed by a tokio broadcast channel
///
/// Publishing never blocks. Subscribers that fall more than `capacity`
/// notifications behind lose the oldest ones.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<BookingNotification>,
}

impl BroadcastNotifier {
    /// Create a notifier buffering up to `capacity` notifications per subscriber
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every notification published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BookingNotification> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl BookingNotifier for BroadcastNotifier {
    fn publish(&self, notification: BookingNotification) {
        match self.sender.send(notification) {
            Ok(receivers) => {
                tracing::trace!(receivers, "Booking notification broadcast");
            },
            Err(broadcast::error::SendError(notification)) => {
                tracing::trace!(
                    booking_id = %notification.booking_id,
                    "No subscribers for booking notification"
                );
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use broom_fairy_core::notification::NotificationKind;
    use broom_fairy_core::status::BookingStatus;
    use broom_fairy_core::types::BookingId;
    use chrono::Utc;

    fn notification(kind: NotificationKind) -> BookingNotification {
        BookingNotification {
            kind,
            booking_id: BookingId::new(),
            status: BookingStatus::Pending,
            fee_charged: None,
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn subscribers_receive_published_notifications() {
        let notifier = BroadcastNotifier::new(8);
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();
        assert_eq!(notifier.subscriber_count(), 2);

        let sent = notification(NotificationKind::Created);
        notifier.publish(sent.clone());

        assert_eq!(first.recv().await.unwrap(), sent);
        assert_eq!(second.recv().await.unwrap(), sent);
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let notifier = BroadcastNotifier::new(0);
        notifier.publish(notification(NotificationKind::Cancelled));
        assert_eq!(notifier.subscriber_count(), 0);
    }
}
