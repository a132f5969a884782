//! # Supplier Repository
//!
//! Master-data operations for suppliers. Same shape as warehouses; the
//! guard only watches purchases since adjustments never name a supplier.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::query::{Page, Pagination};
use stockroom_core::types::Supplier;
use stockroom_core::validation::validate_name;

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Inserts a new supplier.
    pub async fn insert(&self, supplier: &Supplier) -> DbResult<Supplier> {
        validate_name(&supplier.name)?;

        debug!(name = %supplier.name, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, company, phone, email, address, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.company)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier.clone())
    }

    /// Gets a supplier by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(supplier)
    }

    /// Lists suppliers, paginated, ordered by name.
    pub async fn list(&self, pagination: &Pagination) -> DbResult<Page<Supplier>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.pool)
            .await?;

        let suppliers =
            sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name LIMIT ? OFFSET ?")
                .bind(i64::from(pagination.limit()))
                .bind(pagination.offset())
                .fetch_all(&self.pool)
                .await?;

        Ok(Page::new(suppliers, total, pagination))
    }

    /// Updates an existing supplier.
    pub async fn update(&self, supplier: &Supplier) -> DbResult<()> {
        validate_name(&supplier.name)?;

        debug!(id = %supplier.id, "Updating supplier");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?,
                company = ?,
                phone = ?,
                email = ?,
                address = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.company)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(now)
        .bind(&supplier.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", &supplier.id));
        }

        Ok(())
    }

    /// Hard-deletes a supplier.
    ///
    /// Refused while any purchase references it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting supplier");

        let mut tx = self.pool.begin().await?;

        let purchase_refs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE supplier_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if purchase_refs > 0 {
            return Err(DbError::referenced(
                "Supplier",
                id,
                vec![("purchase".to_string(), purchase_refs)],
            ));
        }

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Helper to generate a new supplier ID.
pub fn generate_supplier_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil::{make_supplier, test_db};

    #[tokio::test]
    async fn test_crud() {
        let db = test_db().await;

        let mut supplier = make_supplier("Acme Supply");
        db.suppliers().insert(&supplier).await.unwrap();

        supplier.company = Some("Acme Corp".to_string());
        db.suppliers().update(&supplier).await.unwrap();

        let fetched = db
            .suppliers()
            .get_by_id(&supplier.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.company.as_deref(), Some("Acme Corp"));

        let page = db.suppliers().list(&Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);

        db.suppliers().delete(&supplier.id).await.unwrap();
        assert!(db
            .suppliers()
            .get_by_id(&supplier.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_missing_supplier() {
        let db = test_db().await;

        let supplier = make_supplier("Ghost");
        let err = db.suppliers().update(&supplier).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
