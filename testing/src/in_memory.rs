//! `HashMap`-backed repositories.
//!
//! - [`InMemoryBookingRepository`]: bookings with version compare-and-swap
//! - [`InMemoryServiceCatalog`]: catalog entries
//!
//! Both check and write under a single lock, so two saves racing on the same
//! version can never both succeed. Clones share storage.

use broom_fairy_core::repository::{
    BookingFilter, BookingRepository, RepositoryError, RepositoryFuture, ServiceCatalog,
};
use broom_fairy_core::types::{Booking, BookingId, Service, ServiceId, Version};
use std::collections::HashMap;
use std::future;
use std::sync::{Arc, PoisonError, RwLock};

fn poisoned<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::Database("in-memory store lock poisoned".to_string())
}

/// In-memory booking storage
///
/// # Example
///
/// ```
/// use broom_fairy_core::repository::BookingRepository;
/// use broom_fairy_testing::in_memory::InMemoryBookingRepository;
///
/// # async fn example(booking: broom_fairy_core::types::Booking) -> Result<(), Box<dyn std::error::Error>> {
/// let repository = InMemoryBookingRepository::new();
/// repository.insert_booking(booking.clone()).await?;
///
/// let version = repository.save_booking(booking.clone(), booking.version).await?;
/// assert_eq!(version, booking.version.next());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryBookingRepository {
    bookings: Arc<RwLock<HashMap<BookingId, Booking>>>,
}

impl InMemoryBookingRepository {
    /// Create a new empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored bookings
    #[must_use]
    pub fn len(&self) -> usize {
        self.bookings.read().map_or(0, |bookings| bookings.len())
    }

    /// Check if the repository is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, booking: Booking) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.write().map_err(poisoned)?;
        if bookings.contains_key(&booking.id) {
            return Err(RepositoryError::AlreadyExists(format!("booking {}", booking.id)));
        }
        bookings.insert(booking.id, booking);
        Ok(())
    }

    fn load(&self, id: BookingId) -> Result<Booking, RepositoryError> {
        self.bookings
            .read()
            .map_err(poisoned)?
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    fn save(&self, mut booking: Booking, expected_version: Version) -> Result<Version, RepositoryError> {
        let mut bookings = self.bookings.write().map_err(poisoned)?;
        let stored = bookings
            .get_mut(&booking.id)
            .ok_or(RepositoryError::NotFound(booking.id))?;

        if stored.version != expected_version {
            tracing::debug!(
                booking_id = %booking.id,
                expected = %expected_version,
                actual = %stored.version,
                "Rejected stale booking save"
            );
            return Err(RepositoryError::VersionConflict {
                booking_id: booking.id,
                expected: expected_version,
                actual: stored.version,
            });
        }

        let version = expected_version.next();
        booking.version = version;
        *stored = booking;
        Ok(version)
    }

    fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, RepositoryError> {
        let mut matching: Vec<Booking> = self
            .bookings
            .read()
            .map_err(poisoned)?
            .values()
            .filter(|booking| filter.matches(booking))
            .cloned()
            .collect();
        matching.sort_by_key(|booking| (booking.scheduled_start, booking.created_at));
        Ok(matching)
    }
}

impl BookingRepository for InMemoryBookingRepository {
    fn insert_booking(&self, booking: Booking) -> RepositoryFuture<'_, ()> {
        Box::pin(future::ready(self.insert(booking)))
    }

    fn load_booking(&self, id: BookingId) -> RepositoryFuture<'_, Booking> {
        Box::pin(future::ready(self.load(id)))
    }

    fn save_booking(&self, booking: Booking, expected_version: Version) -> RepositoryFuture<'_, Version> {
        Box::pin(future::ready(self.save(booking, expected_version)))
    }

    fn list_bookings(&self, filter: BookingFilter) -> RepositoryFuture<'_, Vec<Booking>> {
        Box::pin(future::ready(self.list(&filter)))
    }
}

/// In-memory service catalog
#[derive(Clone, Debug, Default)]
pub struct InMemoryServiceCatalog {
    services: Arc<RwLock<HashMap<ServiceId, Service>>>,
}

impl InMemoryServiceCatalog {
    /// Create a new empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-filled with `services`
    #[must_use]
    pub fn with_services(services: impl IntoIterator<Item = Service>) -> Self {
        let services = services.into_iter().map(|service| (service.id, service)).collect();
        Self {
            services: Arc::new(RwLock::new(services)),
        }
    }

    fn get(&self, id: ServiceId) -> Result<Service, RepositoryError> {
        self.services
            .read()
            .map_err(poisoned)?
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::ServiceNotFound(id))
    }

    fn list(&self) -> Result<Vec<Service>, RepositoryError> {
        let mut services: Vec<Service> = self.services.read().map_err(poisoned)?.values().cloned().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    fn insert(&self, service: Service) -> Result<(), RepositoryError> {
        let mut services = self.services.write().map_err(poisoned)?;
        if services.contains_key(&service.id) {
            return Err(RepositoryError::AlreadyExists(format!("service {}", service.id)));
        }
        services.insert(service.id, service);
        Ok(())
    }
}

impl ServiceCatalog for InMemoryServiceCatalog {
    fn get_service(&self, id: ServiceId) -> RepositoryFuture<'_, Service> {
        Box::pin(future::ready(self.get(id)))
    }

    fn list_services(&self) -> RepositoryFuture<'_, Vec<Service>> {
        Box::pin(future::ready(self.list()))
    }

    fn insert_service(&self, service: Service) -> RepositoryFuture<'_, ()> {
        Box::pin(future::ready(self.insert(service)))
    }
}
