//! Racing writers against the same booking version.

#![allow(clippy::unwrap_used, clippy::panic)] // Test code

use broom_fairy_bookings::aggregate::BookingEnvironment;
use broom_fairy_bookings::service::{BookingService, NewBooking};
use broom_fairy_core::environment::Clock;
use broom_fairy_core::error::BookingError;
use broom_fairy_core::policy::CancellationPolicy;
use broom_fairy_core::repository::{BookingFilter, BookingRepository, RepositoryFuture};
use broom_fairy_core::status::BookingStatus;
use broom_fairy_core::types::{Booking, BookingId, Money, Service, ServiceId, UserId, Version};
use broom_fairy_testing::in_memory::{InMemoryBookingRepository, InMemoryServiceCatalog};
use broom_fairy_testing::{RecordingNotifier, test_clock};
use chrono::Duration;
use std::sync::Arc;
use tokio::sync::Barrier;

/// Repository whose loads wait until `parties` callers have loaded, so every
/// racer starts from the same version
struct RendezvousRepository {
    inner: InMemoryBookingRepository,
    barrier: Barrier,
}

impl RendezvousRepository {
    fn new(inner: InMemoryBookingRepository, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
        }
    }
}

impl BookingRepository for RendezvousRepository {
    fn insert_booking(&self, booking: Booking) -> RepositoryFuture<'_, ()> {
        self.inner.insert_booking(booking)
    }

    fn load_booking(&self, id: BookingId) -> RepositoryFuture<'_, Booking> {
        Box::pin(async move {
            let booking = self.inner.load_booking(id).await?;
            self.barrier.wait().await;
            Ok(booking)
        })
    }

    fn save_booking(&self, booking: Booking, expected_version: Version) -> RepositoryFuture<'_, Version> {
        self.inner.save_booking(booking, expected_version)
    }

    fn list_bookings(&self, filter: BookingFilter) -> RepositoryFuture<'_, Vec<Booking>> {
        self.inner.list_bookings(filter)
    }
}

#[tokio::test]
async fn cancel_and_confirm_on_same_version_exactly_one_wins() {
    let clock = test_clock();
    let notifier = RecordingNotifier::new();
    let deep_clean = Service::new(ServiceId::new(), "Deep clean", "", Money::new(180_000), 240).unwrap();

    let store = InMemoryBookingRepository::new();
    let service = BookingService::new(
        Arc::new(RendezvousRepository::new(store.clone(), 2)),
        Arc::new(InMemoryServiceCatalog::with_services([deep_clean.clone()])),
        BookingEnvironment::new(
            Arc::new(clock.clone()),
            CancellationPolicy::default(),
            Arc::new(notifier.clone()),
        ),
    );

    let booking = service
        .create_booking(NewBooking {
            client_id: UserId::new(),
            expert_id: UserId::new(),
            service_id: deep_clean.id,
            scheduled_start: clock.now() + Duration::hours(24),
            notes: None,
        })
        .await
        .unwrap();

    let (cancelled, confirmed) = tokio::join!(
        service.cancel_booking(booking.id, None),
        service.change_status(booking.id, BookingStatus::Confirmed),
    );

    let successes = usize::from(cancelled.is_ok()) + usize::from(confirmed.is_ok());
    assert_eq!(successes, 1, "exactly one writer should win");

    let loser = match (cancelled, confirmed) {
        (Err(error), Ok(_)) | (Ok(_), Err(error)) => error,
        other => panic!("expected exactly one failure, got {other:?}"),
    };
    assert_eq!(
        loser,
        BookingError::VersionConflict {
            booking_id: booking.id,
            expected: Version::INITIAL,
            actual: Version::new(2),
        }
    );

    let stored = store.load_booking(booking.id).await.unwrap();
    assert_eq!(stored.version, Version::new(2));

    // created + the winner only
    assert_eq!(notifier.published().len(), 2);
}

#[tokio::test]
async fn stale_writer_can_retry_with_fresh_data() {
    let clock = test_clock();
    let deep_clean = Service::new(ServiceId::new(), "Deep clean", "", Money::new(180_000), 240).unwrap();
    let store = InMemoryBookingRepository::new();
    let service = BookingService::new(
        Arc::new(store.clone()),
        Arc::new(InMemoryServiceCatalog::with_services([deep_clean.clone()])),
        BookingEnvironment::new(
            Arc::new(clock.clone()),
            CancellationPolicy::default(),
            Arc::new(RecordingNotifier::new()),
        ),
    );

    let booking = service
        .create_booking(NewBooking {
            client_id: UserId::new(),
            expert_id: UserId::new(),
            service_id: deep_clean.id,
            scheduled_start: clock.now() + Duration::hours(6),
            notes: None,
        })
        .await
        .unwrap();

    // Another writer moves the booking on behind our back
    let mut concurrent = booking.clone();
    concurrent.status = BookingStatus::Confirmed;
    store.save_booking(concurrent, Version::INITIAL).await.unwrap();

    // The service always loads fresh data, so a retry sees version 2
    let outcome = service.cancel_booking(booking.id, None).await.unwrap();
    assert_eq!(outcome.booking.version, Version::new(3));
    assert!(outcome.decision.chargeable);
    assert_eq!(outcome.booking.fee_charged(), Some(Money::new(180_000)));
}
