//! Persistence contracts.
//!
//! Repositories hand back owned values and enforce optimistic concurrency:
//! [`BookingRepository::save_booking`] only succeeds if the stored version
//! still equals the version the caller loaded.
//!
//! Methods return boxed futures so the traits stay dyn-compatible and can be
//! shared as `Arc<dyn BookingRepository>`.

use crate::error::BookingError;
use crate::status::BookingStatus;
use crate::types::{Booking, BookingId, Service, ServiceId, UserId, Version};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Future returned by repository methods
pub type RepositoryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Errors reported by persistence backends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No booking with this id
    #[error("Booking not found: {0}")]
    NotFound(BookingId),

    /// No service with this id
    #[error("Service not found: {0}")]
    ServiceNotFound(ServiceId),

    /// Stored version differs from the expected one
    #[error("Concurrency conflict for booking {booking_id}: expected version {expected}, but current version is {actual}")]
    VersionConflict {
        /// Booking being saved
        booking_id: BookingId,
        /// Version the caller loaded
        expected: Version,
        /// Version currently stored
        actual: Version,
    },

    /// Identifier already taken
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Backend failure
    #[error("Database error: {0}")]
    Database(String),
}

impl From<RepositoryError> for BookingError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => Self::NotFound(id),
            RepositoryError::ServiceNotFound(id) => Self::ServiceNotFound(id),
            RepositoryError::VersionConflict {
                booking_id,
                expected,
                actual,
            } => Self::VersionConflict {
                booking_id,
                expected,
                actual,
            },
            RepositoryError::AlreadyExists(what) => Self::AlreadyExists(what),
            RepositoryError::Database(message) => Self::Storage(message),
        }
    }
}

/// Criteria for listing bookings; unset fields match everything
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct BookingFilter {
    /// Only bookings of this client
    pub client_id: Option<UserId>,
    /// Only bookings with this expert
    pub expert_id: Option<UserId>,
    /// Only bookings in this status
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    /// Whether `booking` satisfies every set criterion
    #[must_use]
    pub fn matches(&self, booking: &Booking) -> bool {
        self.client_id.is_none_or(|id| id == booking.client_id)
            && self.expert_id.is_none_or(|id| id == booking.expert_id)
            && self.status.is_none_or(|status| status == booking.status)
    }
}

/// Storage for bookings with compare-and-swap on the version
pub trait BookingRepository: Send + Sync {
    /// Stores a new booking
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::AlreadyExists`] if the id is taken.
    fn insert_booking(&self, booking: Booking) -> RepositoryFuture<'_, ()>;

    /// Loads a booking
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if there is no such booking.
    fn load_booking(&self, id: BookingId) -> RepositoryFuture<'_, Booking>;

    /// Overwrites a booking if its stored version equals `expected_version`
    ///
    /// On success the stored version is `expected_version.next()`, which is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::VersionConflict`] if another writer got
    /// there first, or [`RepositoryError::NotFound`] if the booking is gone.
    fn save_booking(&self, booking: Booking, expected_version: Version) -> RepositoryFuture<'_, Version>;

    /// Lists bookings matching `filter`, ordered by scheduled start
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] on backend failure.
    fn list_bookings(&self, filter: BookingFilter) -> RepositoryFuture<'_, Vec<Booking>>;
}

/// Catalog of bookable services
pub trait ServiceCatalog: Send + Sync {
    /// Loads a service
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ServiceNotFound`] if there is no such service.
    fn get_service(&self, id: ServiceId) -> RepositoryFuture<'_, Service>;

    /// Lists every service, ordered by name
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] on backend failure.
    fn list_services(&self) -> RepositoryFuture<'_, Vec<Service>>;

    /// Adds a service
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::AlreadyExists`] if the id is taken.
    fn insert_service(&self, service: Service) -> RepositoryFuture<'_, ()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Money;
    use chrono::{Duration, TimeZone, Utc};

    fn booking(client_id: UserId, expert_id: UserId) -> Booking {
        let now = Utc.with_ymd_and_hms(2025, 5, 2, 8, 0, 0).unwrap();
        Booking::new(
            BookingId::new(),
            client_id,
            expert_id,
            ServiceId::new(),
            now + Duration::hours(24),
            Money::new(180_000),
            None,
            now,
        )
    }

    #[test]
    fn empty_filter_matches_everything() {
        let booking = booking(UserId::new(), UserId::new());
        assert!(BookingFilter::default().matches(&booking));
    }

    #[test]
    fn filter_combines_criteria() {
        let client = UserId::new();
        let booking = booking(client, UserId::new());

        let by_client = BookingFilter {
            client_id: Some(client),
            ..BookingFilter::default()
        };
        assert!(by_client.matches(&booking));

        let wrong_status = BookingFilter {
            client_id: Some(client),
            status: Some(BookingStatus::Confirmed),
            ..BookingFilter::default()
        };
        assert!(!wrong_status.matches(&booking));
    }

    #[test]
    fn repository_conflict_becomes_domain_conflict() {
        let booking_id = BookingId::new();
        let err: BookingError = RepositoryError::VersionConflict {
            booking_id,
            expected: Version::new(1),
            actual: Version::new(2),
        }
        .into();

        assert_eq!(
            err,
            BookingError::VersionConflict {
                booking_id,
                expected: Version::new(1),
                actual: Version::new(2),
            }
        );
    }
}
