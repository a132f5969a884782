//! # Warehouse Repository
//!
//! Master-data operations for warehouses. Read-mostly: documents validate
//! against warehouses, and the referential guard keeps deletes honest.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::query::{Page, Pagination};
use stockroom_core::types::Warehouse;
use stockroom_core::validation::validate_name;

/// Repository for warehouse database operations.
#[derive(Debug, Clone)]
pub struct WarehouseRepository {
    pool: SqlitePool,
}

impl WarehouseRepository {
    /// Creates a new WarehouseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WarehouseRepository { pool }
    }

    /// Inserts a new warehouse.
    pub async fn insert(&self, warehouse: &Warehouse) -> DbResult<Warehouse> {
        validate_name(&warehouse.name)?;

        debug!(name = %warehouse.name, "Inserting warehouse");

        sqlx::query(
            r#"
            INSERT INTO warehouses (id, name, phone, email, address, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&warehouse.id)
        .bind(&warehouse.name)
        .bind(&warehouse.phone)
        .bind(&warehouse.email)
        .bind(&warehouse.address)
        .bind(warehouse.created_at)
        .bind(warehouse.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(warehouse.clone())
    }

    /// Gets a warehouse by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Warehouse>> {
        let warehouse = sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(warehouse)
    }

    /// Lists warehouses, paginated, ordered by name.
    pub async fn list(&self, pagination: &Pagination) -> DbResult<Page<Warehouse>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM warehouses")
            .fetch_one(&self.pool)
            .await?;

        let warehouses = sqlx::query_as::<_, Warehouse>(
            "SELECT * FROM warehouses ORDER BY name LIMIT ? OFFSET ?",
        )
        .bind(i64::from(pagination.limit()))
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(warehouses, total, pagination))
    }

    /// Updates an existing warehouse.
    pub async fn update(&self, warehouse: &Warehouse) -> DbResult<()> {
        validate_name(&warehouse.name)?;

        debug!(id = %warehouse.id, "Updating warehouse");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE warehouses SET
                name = ?,
                phone = ?,
                email = ?,
                address = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&warehouse.name)
        .bind(&warehouse.phone)
        .bind(&warehouse.email)
        .bind(&warehouse.address)
        .bind(now)
        .bind(&warehouse.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Warehouse", &warehouse.id));
        }

        Ok(())
    }

    /// Hard-deletes a warehouse.
    ///
    /// Refused while any adjustment or purchase references it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting warehouse");

        let mut tx = self.pool.begin().await?;

        let adjustment_refs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM adjustments WHERE warehouse_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        let purchase_refs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE warehouse_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        let mut blocking = Vec::new();
        if adjustment_refs > 0 {
            blocking.push(("adjustment".to_string(), adjustment_refs));
        }
        if purchase_refs > 0 {
            blocking.push(("purchase".to_string(), purchase_refs));
        }
        if !blocking.is_empty() {
            return Err(DbError::referenced("Warehouse", id, blocking));
        }

        let result = sqlx::query("DELETE FROM warehouses WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Warehouse", id));
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Helper to generate a new warehouse ID.
pub fn generate_warehouse_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil::{make_warehouse, test_db};

    #[tokio::test]
    async fn test_crud() {
        let db = test_db().await;

        let mut warehouse = make_warehouse("Main");
        db.warehouses().insert(&warehouse).await.unwrap();

        warehouse.name = "Main Street".to_string();
        warehouse.phone = Some("555-0101".to_string());
        db.warehouses().update(&warehouse).await.unwrap();

        let fetched = db
            .warehouses()
            .get_by_id(&warehouse.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.name, "Main Street");
        assert_eq!(fetched.phone.as_deref(), Some("555-0101"));

        let page = db.warehouses().list(&Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);

        db.warehouses().delete(&warehouse.id).await.unwrap();
        assert!(db
            .warehouses()
            .get_by_id(&warehouse.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let db = test_db().await;

        let mut warehouse = make_warehouse("Main");
        warehouse.name = "   ".to_string();

        let err = db.warehouses().insert(&warehouse).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
