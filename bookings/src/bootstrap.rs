//! Wiring: storage backends, environment and application state.

use crate::aggregate::BookingEnvironment;
use crate::config::{BookingsConfig, StorageConfig};
use crate::notifier::BroadcastNotifier;
use crate::server::AppState;
use crate::service::BookingService;
use broom_fairy_core::environment::{BookingNotifier, Clock};
use broom_fairy_core::policy::CancellationPolicy;
use broom_fairy_core::repository::{BookingRepository, RepositoryError, ServiceCatalog};
use broom_fairy_postgres::{PostgresBookingRepository, PostgresServiceCatalog};
use broom_fairy_testing::in_memory::{InMemoryBookingRepository, InMemoryServiceCatalog};
use std::sync::Arc;

/// Booking repository and catalog sharing one backend
#[derive(Clone)]
pub struct Storage {
    /// Booking persistence
    pub bookings: Arc<dyn BookingRepository>,
    /// Service catalog
    pub catalog: Arc<dyn ServiceCatalog>,
}

impl Storage {
    /// Empty process-local storage
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            bookings: Arc::new(InMemoryBookingRepository::new()),
            catalog: Arc::new(InMemoryServiceCatalog::new()),
        }
    }

    /// Connect to the configured backend, running migrations for postgres
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the database cannot be
    /// reached or migrated.
    pub async fn connect(config: &StorageConfig) -> Result<Self, RepositoryError> {
        match config {
            StorageConfig::Memory => {
                tracing::warn!("Using in-memory storage; bookings are lost on restart");
                Ok(Self::in_memory())
            },
            StorageConfig::Postgres(postgres) => {
                let pool = broom_fairy_postgres::connect(&postgres.url, &postgres.pool_settings()).await?;
                broom_fairy_postgres::migrate(&pool).await?;
                tracing::info!(
                    max_connections = postgres.max_connections,
                    "Connected to PostgreSQL"
                );

                Ok(Self {
                    bookings: Arc::new(PostgresBookingRepository::new(pool.clone())),
                    catalog: Arc::new(PostgresServiceCatalog::new(pool)),
                })
            },
        }
    }
}

/// Build the shared state the router runs on
#[must_use]
pub fn build_state(storage: Storage, clock: Arc<dyn Clock>, config: &BookingsConfig) -> AppState {
    let notifier = Arc::new(BroadcastNotifier::new(config.notification_capacity));
    let sink: Arc<dyn BookingNotifier> = notifier.clone();
    let env = BookingEnvironment::new(
        clock,
        CancellationPolicy::from_hours(config.cancellation_window_hours),
        sink,
    );
    let service = Arc::new(BookingService::new(storage.bookings, storage.catalog, env));

    AppState::new(service, notifier)
}
