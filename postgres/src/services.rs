//! Service catalog rows.

use crate::{database_error, from_db_amount, is_unique_violation, to_db_amount};
use broom_fairy_core::repository::{RepositoryError, RepositoryFuture, ServiceCatalog};
use broom_fairy_core::types::{Money, Service, ServiceId};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// `PostgreSQL` service catalog
#[derive(Clone, Debug)]
pub struct PostgresServiceCatalog {
    pool: PgPool,
}

impl PostgresServiceCatalog {
    /// Create a catalog on an existing pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn get(&self, id: ServiceId) -> Result<Service, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, description, price, duration_minutes, active FROM services WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error(&e))?
        .ok_or(RepositoryError::ServiceNotFound(id))?;

        row_to_service(&row)
    }

    async fn list(&self) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, description, price, duration_minutes, active FROM services ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(&e))?;

        rows.iter().map(row_to_service).collect()
    }

    async fn insert(&self, service: Service) -> Result<(), RepositoryError> {
        let duration = i32::try_from(service.duration_minutes).map_err(|_| {
            RepositoryError::Database(format!("duration {} out of range", service.duration_minutes))
        })?;

        sqlx::query(
            r"
            INSERT INTO services (id, name, description, price, duration_minutes, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(service.id.as_uuid())
        .bind(&service.name)
        .bind(&service.description)
        .bind(to_db_amount(service.price.amount())?)
        .bind(duration)
        .bind(service.active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::AlreadyExists(format!("service {}", service.id))
            } else {
                database_error(&e)
            }
        })?;

        Ok(())
    }
}

impl ServiceCatalog for PostgresServiceCatalog {
    fn get_service(&self, id: ServiceId) -> RepositoryFuture<'_, Service> {
        Box::pin(self.get(id))
    }

    fn list_services(&self) -> RepositoryFuture<'_, Vec<Service>> {
        Box::pin(self.list())
    }

    fn insert_service(&self, service: Service) -> RepositoryFuture<'_, ()> {
        Box::pin(self.insert(service))
    }
}

fn row_to_service(row: &PgRow) -> Result<Service, RepositoryError> {
    let get_err = |e: sqlx::Error| database_error(&e);
    let duration: i32 = row.try_get("duration_minutes").map_err(get_err)?;

    Ok(Service {
        id: ServiceId::from_uuid(row.try_get("id").map_err(get_err)?),
        name: row.try_get("name").map_err(get_err)?,
        description: row.try_get("description").map_err(get_err)?,
        price: Money::new(from_db_amount(row.try_get("price").map_err(get_err)?)?),
        duration_minutes: u32::try_from(duration)
            .map_err(|_| RepositoryError::Database(format!("negative duration {duration} in database")))?,
        active: row.try_get("active").map_err(get_err)?,
    })
}
