//! Postgres-backed unit store.
//!
//! Expects a table of the shape:
//!
//! ```sql
//! CREATE TABLE units (
//!     id       UUID PRIMARY KEY,
//!     class_id UUID NOT NULL,
//!     title    TEXT NOT NULL
//! );
//! CREATE INDEX units_class_id_idx ON units (class_id);
//! ```
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | any other | `Backend` |
//! | RowNotFound | N/A | `NotFound` |
//! | Other | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use unitsvc_core::{ClassId, Entity, Unit, UnitId};

use super::r#trait::{StoreError, UnitStore};

#[derive(Debug, Clone)]
pub struct PostgresUnitStore {
    pool: Arc<PgPool>,
}

impl PostgresUnitStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl UnitStore for PostgresUnitStore {
    #[instrument(skip(self), fields(unit_id = %id), err)]
    async fn get_by_id(&self, id: UnitId) -> Result<Unit, StoreError> {
        let row = sqlx::query("SELECT id, class_id, title FROM units WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_by_id", e, id))?
            .ok_or(StoreError::NotFound)?;

        UnitRow::from_row(&row)
            .map(Unit::from)
            .map_err(|e| StoreError::Backend(format!("failed to decode unit row: {e}")))
    }

    #[instrument(skip(self), fields(class_id = %class_id), err)]
    async fn list_by_class(&self, class_id: ClassId) -> Result<Vec<Unit>, StoreError> {
        let rows = sqlx::query("SELECT id, class_id, title FROM units WHERE class_id = $1 ORDER BY id ASC")
            .bind(class_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("sqlx error in list_by_class: {e}")))?;

        rows.iter()
            .map(|row| {
                UnitRow::from_row(row)
                    .map(Unit::from)
                    .map_err(|e| StoreError::Backend(format!("failed to decode unit row: {e}")))
            })
            .collect()
    }

    #[instrument(skip(self, unit), fields(unit_id = %unit.id(), class_id = %unit.class_id()), err)]
    async fn insert(&self, unit: Unit) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO units (id, class_id, title) VALUES ($1, $2, $3)")
            .bind(unit.id().as_uuid())
            .bind(unit.class_id().as_uuid())
            .bind(unit.title())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e, *unit.id()))?;
        Ok(())
    }

    #[instrument(skip(self, unit), fields(unit_id = %unit.id()), err)]
    async fn update(&self, unit: Unit) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE units SET title = $2 WHERE id = $1")
            .bind(unit.id().as_uuid())
            .bind(unit.title())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e, *unit.id()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(unit_id = %id), err)]
    async fn delete(&self, id: UnitId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM units WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e, id))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error, id: UnitId) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                StoreError::Duplicate(id)
            } else {
                StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

#[derive(Debug)]
struct UnitRow {
    id: uuid::Uuid,
    class_id: uuid::Uuid,
    title: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UnitRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UnitRow {
            id: row.try_get("id")?,
            class_id: row.try_get("class_id")?,
            title: row.try_get("title")?,
        })
    }
}

impl From<UnitRow> for Unit {
    fn from(row: UnitRow) -> Self {
        Unit::new(UnitId::from_uuid(row.id), ClassId::from_uuid(row.class_id), row.title)
    }
}
