//! # Adjustment Repository
//!
//! Database operations for stock adjustments and their line items.
//!
//! ## Mutation Choreography
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Every mutation is ONE transaction                          │
//! │                                                                         │
//! │  CREATE                                                                │
//! │    └── check warehouse ── check reference ── insert header             │
//! │        ── snapshot pre-stock per item ── insert items                  │
//! │        ── apply netted deltas ── commit                                │
//! │                                                                         │
//! │  UPDATE (full replace)                                                 │
//! │    └── reverse old item deltas ── delete old items                     │
//! │        ── rewrite header ── insert new items ── apply new deltas       │
//! │        ── commit                                                       │
//! │                                                                         │
//! │  DELETE                                                                │
//! │    └── reverse item deltas ── delete document (items cascade)          │
//! │        ── commit                                                       │
//! │                                                                         │
//! │  Any failure anywhere rolls ALL of it back - a document and its        │
//! │  ledger footprint are never observable half-applied.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::query::{Page, Pagination};
use crate::repository::generate_reference;
use crate::repository::product::apply_stock_delta;
use stockroom_core::ledger::{adjustment_input_deltas, adjustment_reversal_deltas, net_deltas};
use stockroom_core::types::{Adjustment, AdjustmentInput, AdjustmentItem, AdjustmentType};
use stockroom_core::validation::validate_adjustment_input;

// =============================================================================
// Filter & Detail Views
// =============================================================================

/// Filter for adjustment listing. All fields combine with AND.
#[derive(Debug, Clone, Default)]
pub struct AdjustmentFilter {
    pub warehouse_id: Option<String>,
    pub adjustment_type: Option<AdjustmentType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Substring match on the reference.
    pub search: Option<String>,
}

/// An adjustment line item joined with its product's code and name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdjustmentItemDetail {
    pub id: String,
    pub adjustment_id: String,
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    pub quantity_milli: i64,
    pub item_type: AdjustmentType,
    pub pre_stock_milli: i64,
    pub created_at: DateTime<Utc>,
}

/// A full adjustment read: header, warehouse name, items with product info.
#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentDetail {
    pub adjustment: Adjustment,
    pub warehouse_name: String,
    pub items: Vec<AdjustmentItemDetail>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &AdjustmentFilter) {
    if let Some(warehouse_id) = &filter.warehouse_id {
        qb.push(" AND warehouse_id = ").push_bind(warehouse_id.clone());
    }
    if let Some(adjustment_type) = filter.adjustment_type {
        qb.push(" AND adjustment_type = ").push_bind(adjustment_type);
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND date <= ").push_bind(to);
    }
    if let Some(search) = &filter.search {
        qb.push(" AND reference LIKE ")
            .push_bind(format!("%{}%", search.trim()));
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for adjustment document operations.
#[derive(Debug, Clone)]
pub struct AdjustmentRepository {
    pool: SqlitePool,
}

impl AdjustmentRepository {
    /// Creates a new AdjustmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AdjustmentRepository { pool }
    }

    /// Creates an adjustment with its items and applies the stock deltas,
    /// all in one transaction.
    ///
    /// ## Returns
    /// * `Ok(Adjustment)` - The persisted header
    /// * `Err(DbError::Validation)` - Bad payload, nothing written
    /// * `Err(DbError::NotFound)` - Warehouse or a line product missing
    /// * `Err(DbError::UniqueViolation)` - Reference already taken
    pub async fn create(&self, input: AdjustmentInput) -> DbResult<Adjustment> {
        validate_adjustment_input(&input)?;

        let mut tx = self.pool.begin().await?;

        ensure_warehouse(&mut tx, &input.warehouse_id).await?;

        let reference = match &input.reference {
            Some(reference) => reference.clone(),
            None => generate_reference("ADJ"),
        };
        ensure_reference_free(&mut tx, &reference, None).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, reference = %reference, "Creating adjustment");

        sqlx::query(
            r#"
            INSERT INTO adjustments (
                id, reference, warehouse_id, date, adjustment_type, note,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&reference)
        .bind(&input.warehouse_id)
        .bind(input.date)
        .bind(input.adjustment_type)
        .bind(&input.note)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &id, &input, now).await?;

        for delta in net_deltas(adjustment_input_deltas(&input.items)) {
            apply_stock_delta(&mut *tx, &delta.product_id, delta.delta.milli()).await?;
        }

        tx.commit().await?;

        Ok(Adjustment {
            id,
            reference,
            warehouse_id: input.warehouse_id,
            date: input.date,
            adjustment_type: input.adjustment_type,
            note: input.note,
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets an adjustment header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Adjustment>> {
        let adjustment =
            sqlx::query_as::<_, Adjustment>("SELECT * FROM adjustments WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(adjustment)
    }

    /// Gets the full detail view: header, warehouse name, items with
    /// product code/name.
    pub async fn get_detail(&self, id: &str) -> DbResult<AdjustmentDetail> {
        let adjustment = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Adjustment", id))?;

        let warehouse_name: String =
            sqlx::query_scalar("SELECT name FROM warehouses WHERE id = ?")
                .bind(&adjustment.warehouse_id)
                .fetch_one(&self.pool)
                .await?;

        let items = sqlx::query_as::<_, AdjustmentItemDetail>(
            r#"
            SELECT
                ai.id,
                ai.adjustment_id,
                ai.product_id,
                p.code AS product_code,
                p.name AS product_name,
                ai.quantity_milli,
                ai.item_type,
                ai.pre_stock_milli,
                ai.created_at
            FROM adjustment_items ai
            INNER JOIN products p ON p.id = ai.product_id
            WHERE ai.adjustment_id = ?
            ORDER BY ai.created_at
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(AdjustmentDetail {
            adjustment,
            warehouse_name,
            items,
        })
    }

    /// Gets all raw items for an adjustment.
    pub async fn get_items(&self, adjustment_id: &str) -> DbResult<Vec<AdjustmentItem>> {
        let items = sqlx::query_as::<_, AdjustmentItem>(
            "SELECT * FROM adjustment_items WHERE adjustment_id = ? ORDER BY created_at",
        )
        .bind(adjustment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists adjustment headers matching the filter, newest date first.
    pub async fn list(
        &self,
        filter: &AdjustmentFilter,
        pagination: &Pagination,
    ) -> DbResult<Page<Adjustment>> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM adjustments WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::new("SELECT * FROM adjustments WHERE 1=1");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY date DESC, created_at DESC LIMIT ")
            .push_bind(i64::from(pagination.limit()))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let adjustments = qb
            .build_query_as::<Adjustment>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(adjustments, total, pagination))
    }

    /// Fully replaces an adjustment: header fields and the entire item set.
    ///
    /// The old items' stock footprint is reversed before the new set is
    /// applied, so editing never double-counts and never leaks.
    pub async fn update(&self, id: &str, input: AdjustmentInput) -> DbResult<Adjustment> {
        validate_adjustment_input(&input)?;

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Adjustment>("SELECT * FROM adjustments WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Adjustment", id))?;

        debug!(id = %id, reference = %existing.reference, "Updating adjustment");

        let old_items = sqlx::query_as::<_, AdjustmentItem>(
            "SELECT * FROM adjustment_items WHERE adjustment_id = ?",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        // Undo the old footprint first so pre-stock snapshots for the new
        // items see a clean ledger.
        for delta in net_deltas(adjustment_reversal_deltas(&old_items)) {
            apply_stock_delta(&mut *tx, &delta.product_id, delta.delta.milli()).await?;
        }

        ensure_warehouse(&mut tx, &input.warehouse_id).await?;

        let reference = match &input.reference {
            Some(reference) => {
                if *reference != existing.reference {
                    ensure_reference_free(&mut tx, reference, Some(id)).await?;
                }
                reference.clone()
            }
            None => existing.reference.clone(),
        };

        sqlx::query("DELETE FROM adjustment_items WHERE adjustment_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE adjustments SET
                reference = ?,
                warehouse_id = ?,
                date = ?,
                adjustment_type = ?,
                note = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&reference)
        .bind(&input.warehouse_id)
        .bind(input.date)
        .bind(input.adjustment_type)
        .bind(&input.note)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, id, &input, now).await?;

        for delta in net_deltas(adjustment_input_deltas(&input.items)) {
            apply_stock_delta(&mut *tx, &delta.product_id, delta.delta.milli()).await?;
        }

        tx.commit().await?;

        Ok(Adjustment {
            id: id.to_string(),
            reference,
            warehouse_id: input.warehouse_id,
            date: input.date,
            adjustment_type: input.adjustment_type,
            note: input.note,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Deletes an adjustment, reversing its stock footprint first.
    /// Items go with the document (ON DELETE CASCADE).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting adjustment");

        let mut tx = self.pool.begin().await?;

        let items = sqlx::query_as::<_, AdjustmentItem>(
            "SELECT * FROM adjustment_items WHERE adjustment_id = ?",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for delta in net_deltas(adjustment_reversal_deltas(&items)) {
            apply_stock_delta(&mut *tx, &delta.product_id, delta.delta.milli()).await?;
        }

        let result = sqlx::query("DELETE FROM adjustments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Adjustment", id));
        }

        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn ensure_warehouse(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    warehouse_id: &str,
) -> DbResult<()> {
    let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM warehouses WHERE id = ?")
        .bind(warehouse_id)
        .fetch_one(&mut **tx)
        .await?;
    if exists == 0 {
        return Err(DbError::not_found("Warehouse", warehouse_id));
    }
    Ok(())
}

/// Checks the reference is not taken by another document. Backed by the
/// UNIQUE index - this check exists for the friendlier error.
async fn ensure_reference_free(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    reference: &str,
    exclude_id: Option<&str>,
) -> DbResult<()> {
    let taken: i64 = match exclude_id {
        Some(id) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM adjustments WHERE reference = ? AND id != ?")
                .bind(reference)
                .bind(id)
                .fetch_one(&mut **tx)
                .await?
        }
        None => sqlx::query_scalar("SELECT COUNT(*) FROM adjustments WHERE reference = ?")
            .bind(reference)
            .fetch_one(&mut **tx)
            .await?,
    };
    if taken > 0 {
        return Err(DbError::duplicate("reference", reference));
    }
    Ok(())
}

/// Inserts the item rows, snapshotting each product's stock as it stands
/// before this document's deltas are applied.
async fn insert_items(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    adjustment_id: &str,
    input: &AdjustmentInput,
    now: DateTime<Utc>,
) -> DbResult<()> {
    for item in &input.items {
        let pre_stock: Option<i64> =
            sqlx::query_scalar("SELECT stock_milli FROM products WHERE id = ?")
                .bind(&item.product_id)
                .fetch_optional(&mut **tx)
                .await?;
        let pre_stock =
            pre_stock.ok_or_else(|| DbError::not_found("Product", &item.product_id))?;

        sqlx::query(
            r#"
            INSERT INTO adjustment_items (
                id, adjustment_id, product_id, quantity_milli, item_type,
                pre_stock_milli, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(adjustment_id)
        .bind(&item.product_id)
        .bind(item.quantity_milli)
        .bind(item.item_type)
        .bind(pre_stock)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
