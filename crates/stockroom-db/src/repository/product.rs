//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Catalog CRUD with code/barcode uniqueness
//! - Filtered, paginated listing
//! - The atomic stock increment every document mutation funnels through
//! - Guarded hard delete (refused while documents reference the product)
//!
//! ## The Atomic Increment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: Absolute update (read-modify-write race)                    │
//! │     stock = SELECT stock_milli ...;  UPDATE ... SET stock_milli = 7    │
//! │                                                                         │
//! │  ✅ CORRECT: Relative increment                                        │
//! │     UPDATE products SET stock_milli = stock_milli + ?                  │
//! │                                                                         │
//! │  Why?                                                                   │
//! │  Mutation A: receives 3.000  → stock + 3000                            │
//! │  Mutation B: adjusts  -2.000 → stock - 2000                            │
//! │  Any interleaving lands on the same value: +3000 - 2000 = +1000        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::query::{Page, Pagination};
use stockroom_core::quantity::Quantity;
use stockroom_core::types::Product;
use stockroom_core::validation::{validate_code, validate_name};

// =============================================================================
// Filter
// =============================================================================

/// Filter for product listing. All fields combine with AND.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Matches code, name, or barcode (substring, case-insensitive per
    /// SQLite LIKE defaults).
    pub search: Option<String>,
    /// Restrict to active/inactive products.
    pub is_active: Option<bool>,
    /// Only products at or below their alert threshold.
    pub low_stock: bool,
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ProductFilter) {
    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.trim());
        qb.push(" AND (code LIKE ")
            .push_bind(pattern.clone())
            .push(" OR name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR barcode LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if filter.low_stock {
        qb.push(" AND stock_milli <= alert_quantity_milli");
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let page = repo.list(&ProductFilter::default(), &Pagination::default()).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::UniqueViolation)` - Code or barcode already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        validate_code(&product.code)?;
        validate_name(&product.name)?;

        debug!(code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, code, barcode, name,
                price_cents, cost_cents, stock_milli, alert_quantity_milli,
                is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.stock_milli)
        .bind(product.alert_quantity_milli)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists products matching the filter, paginated, ordered by name.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        pagination: &Pagination,
    ) -> DbResult<Page<Product>> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM products WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::new("SELECT * FROM products WHERE 1=1");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY name LIMIT ")
            .push_bind(i64::from(pagination.limit()))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let products = qb
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(products, total, pagination))
    }

    /// Lists active products at or below their alert threshold,
    /// lowest stock first.
    pub async fn list_low_stock(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE is_active = 1 AND stock_milli <= alert_quantity_milli
            ORDER BY stock_milli ASC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates an existing product's catalog fields.
    ///
    /// Writes `stock_milli` as-is from the passed product; callers that only
    /// move stock must use [`ProductRepository::adjust_stock`] instead so the
    /// change stays a relative increment.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        validate_code(&product.code)?;
        validate_name(&product.name)?;

        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?,
                barcode = ?,
                name = ?,
                price_cents = ?,
                cost_cents = ?,
                alert_quantity_milli = ?,
                is_active = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.code)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.alert_quantity_milli)
        .bind(product.is_active)
        .bind(now)
        .bind(&product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Applies a signed stock delta outside any document (manual correction).
    ///
    /// Document mutations never call this; they apply deltas through their
    /// own transaction via [`apply_stock_delta`].
    pub async fn adjust_stock(&self, id: &str, delta: Quantity) -> DbResult<()> {
        apply_stock_delta(&self.pool, id, delta.milli()).await
    }

    /// Hard-deletes a product.
    ///
    /// ## Referential Guard
    /// Refused while any document line item references the product. All
    /// blocking relations are enumerated in the error, not just the first.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        let adjustment_refs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM adjustment_items WHERE product_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        let purchase_refs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM purchase_items WHERE product_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        let mut blocking = Vec::new();
        if adjustment_refs > 0 {
            blocking.push(("adjustment item".to_string(), adjustment_refs));
        }
        if purchase_refs > 0 {
            blocking.push(("purchase item".to_string(), purchase_refs));
        }
        if !blocking.is_empty() {
            return Err(DbError::referenced("Product", id, blocking));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Shared Increment
// =============================================================================

/// Applies one signed stock delta as a relative increment.
///
/// Generic over the executor so document repositories can run it inside
/// their own transaction (`&mut *tx`) and [`ProductRepository::adjust_stock`]
/// can run it against the pool.
///
/// A zero-row update means the product vanished - inside a document
/// transaction that error rolls the whole mutation back.
pub(crate) async fn apply_stock_delta<'e, E>(
    executor: E,
    product_id: &str,
    delta_milli: i64,
) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    debug!(product_id = %product_id, delta_milli = %delta_milli, "Applying stock delta");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock_milli = stock_milli + ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(delta_milli)
    .bind(now)
    .bind(product_id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", product_id));
    }

    Ok(())
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil::{make_product, stock_of, test_db};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;

        let product = make_product("SKU-1", 5_000);
        db.products().insert(&product).await.unwrap();

        let fetched = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.code, "SKU-1");
        assert_eq!(fetched.stock_milli, 5_000);

        let by_code = db.products().get_by_code("SKU-1").await.unwrap().unwrap();
        assert_eq!(by_code.id, product.id);

        assert!(db.products().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = test_db().await;

        db.products()
            .insert(&make_product("SKU-1", 0))
            .await
            .unwrap();
        let err = db
            .products()
            .insert(&make_product("SKU-1", 0))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock_is_relative() {
        let db = test_db().await;

        let product = make_product("SKU-1", 5_000);
        db.products().insert(&product).await.unwrap();

        db.products()
            .adjust_stock(&product.id, Quantity::from_milli(2_500))
            .await
            .unwrap();
        db.products()
            .adjust_stock(&product.id, Quantity::from_milli(-10_000))
            .await
            .unwrap();

        // Stock may legitimately go negative
        assert_eq!(stock_of(&db, &product.id).await, -2_500);
    }

    #[tokio::test]
    async fn test_adjust_stock_unknown_product() {
        let db = test_db().await;

        let err = db
            .products()
            .adjust_stock("missing", Quantity::from_units(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_and_pagination() {
        let db = test_db().await;

        for i in 0..15 {
            let mut p = make_product(&format!("SKU-{:02}", i), 1_000);
            p.name = format!("Widget {:02}", i);
            db.products().insert(&p).await.unwrap();
        }
        let mut inactive = make_product("SKU-99", 0);
        inactive.is_active = false;
        db.products().insert(&inactive).await.unwrap();

        let page = db
            .products()
            .list(&ProductFilter::default(), &Pagination::new(1, 10))
            .await
            .unwrap();
        assert_eq!(page.total, 16);
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.total_pages, 2);

        let active_only = ProductFilter {
            is_active: Some(true),
            ..Default::default()
        };
        let page = db
            .products()
            .list(&active_only, &Pagination::new(1, 100))
            .await
            .unwrap();
        assert_eq!(page.total, 15);

        let search = ProductFilter {
            search: Some("Widget 07".to_string()),
            ..Default::default()
        };
        let page = db
            .products()
            .list(&search, &Pagination::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].code, "SKU-07");
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let db = test_db().await;

        let mut low = make_product("LOW-1", 1_000);
        low.alert_quantity_milli = 5_000;
        db.products().insert(&low).await.unwrap();

        let mut fine = make_product("OK-1", 9_000);
        fine.alert_quantity_milli = 5_000;
        db.products().insert(&fine).await.unwrap();

        let listed = db.products().list_low_stock(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].code, "LOW-1");
    }

    #[tokio::test]
    async fn test_delete_without_dependents() {
        let db = test_db().await;

        let product = make_product("SKU-1", 0);
        db.products().insert(&product).await.unwrap();

        db.products().delete(&product.id).await.unwrap();
        assert!(db
            .products()
            .get_by_id(&product.id)
            .await
            .unwrap()
            .is_none());

        let err = db.products().delete(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
