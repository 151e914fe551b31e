//! `PostgreSQL` storage for Broom Fairy bookings.
//!
//! Implements the [`BookingRepository`](broom_fairy_core::repository::BookingRepository)
//! and [`ServiceCatalog`](broom_fairy_core::repository::ServiceCatalog) contracts
//! with sqlx:
//!
//! - Optimistic concurrency via `UPDATE ... WHERE id = $1 AND version = $2`
//! - Embedded migrations (`migrations/`)
//! - Connection pooling
//!
//! # Example
//!
//! ```no_run
//! use broom_fairy_postgres::{PoolSettings, PostgresBookingRepository, connect, migrate};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = connect("postgres://localhost/broom_fairy", &PoolSettings::default()).await?;
//! migrate(&pool).await?;
//! let bookings = PostgresBookingRepository::new(pool);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use broom_fairy_core::repository::RepositoryError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

mod bookings;
mod services;

pub use bookings::PostgresBookingRepository;
pub use services::PostgresServiceCatalog;

/// Connection pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// Seconds to wait for a connection
    pub connect_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            connect_timeout_secs: 30,
        }
    }
}

/// Open a connection pool
///
/// # Errors
///
/// Returns [`RepositoryError::Database`] if the database is unreachable.
pub async fn connect(database_url: &str, settings: &PoolSettings) -> Result<PgPool, RepositoryError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .connect(database_url)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to connect: {e}")))?;

    tracing::info!(max_connections = settings.max_connections, "PostgreSQL pool ready");
    Ok(pool)
}

/// Run the embedded migrations
///
/// # Errors
///
/// Returns [`RepositoryError::Database`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Migration failed: {e}")))
}

fn database_error(e: &sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

fn to_db_amount(amount: u64) -> Result<i64, RepositoryError> {
    i64::try_from(amount).map_err(|_| RepositoryError::Database(format!("amount {amount} out of range")))
}

fn from_db_amount(amount: i64) -> Result<u64, RepositoryError> {
    u64::try_from(amount).map_err(|_| RepositoryError::Database(format!("negative amount {amount} in database")))
}
