//! Booking rows.

use crate::{database_error, from_db_amount, is_foreign_key_violation, is_unique_violation, to_db_amount};
use broom_fairy_core::repository::{BookingFilter, BookingRepository, RepositoryError, RepositoryFuture};
use broom_fairy_core::types::{
    Booking, BookingId, CancellationRecord, Money, ServiceId, UserId, Version,
};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

const BOOKING_COLUMNS: &str = "id, client_id, expert_id, service_id, scheduled_start, status, price, \
     notes, cancellation, created_at, updated_at, version";

/// `PostgreSQL` booking repository
#[derive(Clone, Debug)]
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    /// Create a repository on an existing pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn insert(&self, booking: Booking) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO bookings (
                id, client_id, expert_id, service_id, scheduled_start, status, price,
                notes, cancellation, created_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.client_id.as_uuid())
        .bind(booking.expert_id.as_uuid())
        .bind(booking.service_id.as_uuid())
        .bind(booking.scheduled_start)
        .bind(booking.status.as_str())
        .bind(to_db_amount(booking.price.amount())?)
        .bind(booking.notes.as_deref())
        .bind(booking.cancellation.as_ref().map(Json))
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .bind(to_db_amount(booking.version.value())?)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::AlreadyExists(format!("booking {}", booking.id))
            } else if is_foreign_key_violation(&e) {
                RepositoryError::ServiceNotFound(booking.service_id)
            } else {
                database_error(&e)
            }
        })?;

        tracing::debug!(booking_id = %booking.id, "Booking inserted");
        Ok(())
    }

    async fn load(&self, id: BookingId) -> Result<Booking, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(&e))?
            .ok_or(RepositoryError::NotFound(id))?;

        row_to_booking(&row)
    }

    async fn save(&self, booking: Booking, expected_version: Version) -> Result<Version, RepositoryError> {
        let updated: Option<(i64,)> = sqlx::query_as(
            r"
            UPDATE bookings
            SET status = $3,
                scheduled_start = $4,
                price = $5,
                notes = $6,
                cancellation = $7,
                updated_at = $8,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING version
            ",
        )
        .bind(booking.id.as_uuid())
        .bind(to_db_amount(expected_version.value())?)
        .bind(booking.status.as_str())
        .bind(booking.scheduled_start)
        .bind(to_db_amount(booking.price.amount())?)
        .bind(booking.notes.as_deref())
        .bind(booking.cancellation.as_ref().map(Json))
        .bind(booking.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error(&e))?;

        if let Some((version,)) = updated {
            return Ok(Version::new(from_db_amount(version)?));
        }

        // Nothing matched: either the booking is gone or someone else saved first.
        let current: Option<(i64,)> = sqlx::query_as("SELECT version FROM bookings WHERE id = $1")
            .bind(booking.id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(&e))?;

        match current {
            None => Err(RepositoryError::NotFound(booking.id)),
            Some((actual,)) => Err(RepositoryError::VersionConflict {
                booking_id: booking.id,
                expected: expected_version,
                actual: Version::new(from_db_amount(actual)?),
            }),
        }
    }

    async fn list(&self, filter: BookingFilter) -> Result<Vec<Booking>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE TRUE"));

        if let Some(client_id) = filter.client_id {
            query.push(" AND client_id = ").push_bind(*client_id.as_uuid());
        }
        if let Some(expert_id) = filter.expert_id {
            query.push(" AND expert_id = ").push_bind(*expert_id.as_uuid());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        query.push(" ORDER BY scheduled_start, created_at");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error(&e))?;

        rows.iter().map(row_to_booking).collect()
    }
}

impl BookingRepository for PostgresBookingRepository {
    fn insert_booking(&self, booking: Booking) -> RepositoryFuture<'_, ()> {
        Box::pin(self.insert(booking))
    }

    fn load_booking(&self, id: BookingId) -> RepositoryFuture<'_, Booking> {
        Box::pin(self.load(id))
    }

    fn save_booking(&self, booking: Booking, expected_version: Version) -> RepositoryFuture<'_, Version> {
        Box::pin(self.save(booking, expected_version))
    }

    fn list_bookings(&self, filter: BookingFilter) -> RepositoryFuture<'_, Vec<Booking>> {
        Box::pin(self.list(filter))
    }
}

fn row_to_booking(row: &PgRow) -> Result<Booking, RepositoryError> {
    let get_err = |e: sqlx::Error| database_error(&e);

    let status: String = row.try_get("status").map_err(get_err)?;
    let status = status
        .parse()
        .map_err(|_| RepositoryError::Database(format!("Invalid booking status: {status}")))?;
    let cancellation: Option<Json<CancellationRecord>> = row.try_get("cancellation").map_err(get_err)?;

    Ok(Booking {
        id: BookingId::from_uuid(row.try_get("id").map_err(get_err)?),
        client_id: UserId::from_uuid(row.try_get("client_id").map_err(get_err)?),
        expert_id: UserId::from_uuid(row.try_get("expert_id").map_err(get_err)?),
        service_id: ServiceId::from_uuid(row.try_get("service_id").map_err(get_err)?),
        scheduled_start: row.try_get("scheduled_start").map_err(get_err)?,
        status,
        price: Money::new(from_db_amount(row.try_get("price").map_err(get_err)?)?),
        notes: row.try_get("notes").map_err(get_err)?,
        cancellation: cancellation.map(|Json(record)| record),
        created_at: row.try_get("created_at").map_err(get_err)?,
        updated_at: row.try_get("updated_at").map_err(get_err)?,
        version: Version::new(from_db_amount(row.try_get("version").map_err(get_err)?)?),
    })
}
