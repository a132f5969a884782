//! # Purchase Repository
//!
//! Database operations for purchases and their line items.
//!
//! ## Status-Gated Ledger
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              When does a purchase touch stock?                          │
//! │                                                                         │
//! │  pending ──► ordered ──► received ──► cancelled                        │
//! │     │            │           │             │                            │
//! │     no stock     no stock    +qty per      reversed on the way out     │
//! │     effect       effect      item, once                                 │
//! │                                                                         │
//! │  The decision is made by stockroom_core::ledger::transition_deltas     │
//! │  from (old status, new status, persisted items) - create, update,      │
//! │  patch, and delete all route through the same arithmetic.              │
//! │                                                                         │
//! │  Financial invariant after every committed write:                      │
//! │      due_cents = total_cents - paid_cents                              │
//! │  `due` is never accepted from a caller.                                │
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
use stockroom_core::ledger::{
    derive_due, net_deltas, purchase_input_deltas, purchase_reversal_deltas, resolve_financials,
    transition_deltas,
};
use stockroom_core::money::Money;
use stockroom_core::types::{
    PaymentStatus, Purchase, PurchaseInput, PurchaseItem, PurchasePatch, PurchaseStatus,
};
use stockroom_core::validation::{validate_purchase_input, validate_purchase_patch};

// =============================================================================
// Filter & Detail Views
// =============================================================================

/// Filter for purchase listing. All fields combine with AND.
#[derive(Debug, Clone, Default)]
pub struct PurchaseFilter {
    pub supplier_id: Option<String>,
    pub warehouse_id: Option<String>,
    pub status: Option<PurchaseStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Substring match on the reference.
    pub search: Option<String>,
}

/// A purchase line item joined with its product's code and name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PurchaseItemDetail {
    pub id: String,
    pub purchase_id: String,
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    pub quantity_milli: i64,
    pub unit_cost_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// A full purchase read: header, master-data names, items with product info.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseDetail {
    pub purchase: Purchase,
    pub supplier_name: String,
    pub warehouse_name: String,
    pub items: Vec<PurchaseItemDetail>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &PurchaseFilter) {
    if let Some(supplier_id) = &filter.supplier_id {
        qb.push(" AND supplier_id = ").push_bind(supplier_id.clone());
    }
    if let Some(warehouse_id) = &filter.warehouse_id {
        qb.push(" AND warehouse_id = ").push_bind(warehouse_id.clone());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(payment_status) = filter.payment_status {
        qb.push(" AND payment_status = ").push_bind(payment_status);
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

/// Repository for purchase document operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Creates a purchase with its items in one transaction.
    ///
    /// Items are persisted at any status; stock only moves when the
    /// purchase arrives as `received`. `due` is derived, never read from
    /// the payload.
    pub async fn create(&self, input: PurchaseInput) -> DbResult<Purchase> {
        validate_purchase_input(&input)?;

        let mut tx = self.pool.begin().await?;

        ensure_supplier(&mut tx, &input.supplier_id).await?;
        ensure_warehouse(&mut tx, &input.warehouse_id).await?;

        let reference = match &input.reference {
            Some(reference) => reference.clone(),
            None => generate_reference("PUR"),
        };
        ensure_reference_free(&mut tx, &reference, None).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let due = derive_due(
            Money::from_cents(input.total_cents),
            Money::from_cents(input.paid_cents),
        );

        debug!(id = %id, reference = %reference, status = %input.status.as_str(), "Creating purchase");

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, reference, supplier_id, warehouse_id, date,
                status, payment_status,
                subtotal_cents, tax_rate_bps, tax_cents, discount_cents,
                shipping_cents, total_cents, paid_cents, due_cents,
                note, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&reference)
        .bind(&input.supplier_id)
        .bind(&input.warehouse_id)
        .bind(input.date)
        .bind(input.status)
        .bind(input.payment_status)
        .bind(input.subtotal_cents)
        .bind(input.tax_rate_bps)
        .bind(input.tax_cents)
        .bind(input.discount_cents)
        .bind(input.shipping_cents)
        .bind(input.total_cents)
        .bind(input.paid_cents)
        .bind(due.cents())
        .bind(&input.note)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &id, &input, now).await?;

        for delta in net_deltas(purchase_input_deltas(input.status, &input.items)) {
            apply_stock_delta(&mut *tx, &delta.product_id, delta.delta.milli()).await?;
        }

        tx.commit().await?;

        Ok(Purchase {
            id,
            reference,
            supplier_id: input.supplier_id,
            warehouse_id: input.warehouse_id,
            date: input.date,
            status: input.status,
            payment_status: input.payment_status,
            subtotal_cents: input.subtotal_cents,
            tax_rate_bps: input.tax_rate_bps,
            tax_cents: input.tax_cents,
            discount_cents: input.discount_cents,
            shipping_cents: input.shipping_cents,
            total_cents: input.total_cents,
            paid_cents: input.paid_cents,
            due_cents: due.cents(),
            note: input.note,
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets a purchase header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(purchase)
    }

    /// Gets the full detail view: header, supplier and warehouse names,
    /// items with product code/name.
    pub async fn get_detail(&self, id: &str) -> DbResult<PurchaseDetail> {
        let purchase = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase", id))?;

        let supplier_name: String = sqlx::query_scalar("SELECT name FROM suppliers WHERE id = ?")
            .bind(&purchase.supplier_id)
            .fetch_one(&self.pool)
            .await?;
        let warehouse_name: String =
            sqlx::query_scalar("SELECT name FROM warehouses WHERE id = ?")
                .bind(&purchase.warehouse_id)
                .fetch_one(&self.pool)
                .await?;

        let items = sqlx::query_as::<_, PurchaseItemDetail>(
            r#"
            SELECT
                pi.id,
                pi.purchase_id,
                pi.product_id,
                p.code AS product_code,
                p.name AS product_name,
                pi.quantity_milli,
                pi.unit_cost_cents,
                pi.discount_cents,
                pi.tax_cents,
                pi.subtotal_cents,
                pi.created_at
            FROM purchase_items pi
            INNER JOIN products p ON p.id = pi.product_id
            WHERE pi.purchase_id = ?
            ORDER BY pi.created_at
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(PurchaseDetail {
            purchase,
            supplier_name,
            warehouse_name,
            items,
        })
    }

    /// Gets all raw items for a purchase.
    pub async fn get_items(&self, purchase_id: &str) -> DbResult<Vec<PurchaseItem>> {
        let items = sqlx::query_as::<_, PurchaseItem>(
            "SELECT * FROM purchase_items WHERE purchase_id = ? ORDER BY created_at",
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists purchase headers matching the filter, newest date first.
    pub async fn list(
        &self,
        filter: &PurchaseFilter,
        pagination: &Pagination,
    ) -> DbResult<Page<Purchase>> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM purchases WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::new("SELECT * FROM purchases WHERE 1=1");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY date DESC, created_at DESC LIMIT ")
            .push_bind(i64::from(pagination.limit()))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let purchases = qb
            .build_query_as::<Purchase>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(purchases, total, pagination))
    }

    /// Fully replaces a purchase: header fields and the entire item set.
    ///
    /// The old footprint (if the old status held stock) is reversed before
    /// the new one (if the new status holds stock) is applied. Crossing the
    /// receipt boundary in either direction falls out of that arithmetic
    /// with no special cases.
    pub async fn update(&self, id: &str, input: PurchaseInput) -> DbResult<Purchase> {
        validate_purchase_input(&input)?;

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase", id))?;

        debug!(id = %id, reference = %existing.reference, "Updating purchase");

        let old_items = sqlx::query_as::<_, PurchaseItem>(
            "SELECT * FROM purchase_items WHERE purchase_id = ?",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for delta in net_deltas(purchase_reversal_deltas(existing.status, &old_items)) {
            apply_stock_delta(&mut *tx, &delta.product_id, delta.delta.milli()).await?;
        }

        ensure_supplier(&mut tx, &input.supplier_id).await?;
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

        sqlx::query("DELETE FROM purchase_items WHERE purchase_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let now = Utc::now();
        let due = derive_due(
            Money::from_cents(input.total_cents),
            Money::from_cents(input.paid_cents),
        );

        sqlx::query(
            r#"
            UPDATE purchases SET
                reference = ?,
                supplier_id = ?,
                warehouse_id = ?,
                date = ?,
                status = ?,
                payment_status = ?,
                subtotal_cents = ?,
                tax_rate_bps = ?,
                tax_cents = ?,
                discount_cents = ?,
                shipping_cents = ?,
                total_cents = ?,
                paid_cents = ?,
                due_cents = ?,
                note = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&reference)
        .bind(&input.supplier_id)
        .bind(&input.warehouse_id)
        .bind(input.date)
        .bind(input.status)
        .bind(input.payment_status)
        .bind(input.subtotal_cents)
        .bind(input.tax_rate_bps)
        .bind(input.tax_cents)
        .bind(input.discount_cents)
        .bind(input.shipping_cents)
        .bind(input.total_cents)
        .bind(input.paid_cents)
        .bind(due.cents())
        .bind(&input.note)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, id, &input, now).await?;

        for delta in net_deltas(purchase_input_deltas(input.status, &input.items)) {
            apply_stock_delta(&mut *tx, &delta.product_id, delta.delta.milli()).await?;
        }

        tx.commit().await?;

        Ok(Purchase {
            id: id.to_string(),
            reference,
            supplier_id: input.supplier_id,
            warehouse_id: input.warehouse_id,
            date: input.date,
            status: input.status,
            payment_status: input.payment_status,
            subtotal_cents: input.subtotal_cents,
            tax_rate_bps: input.tax_rate_bps,
            tax_cents: input.tax_cents,
            discount_cents: input.discount_cents,
            shipping_cents: input.shipping_cents,
            total_cents: input.total_cents,
            paid_cents: input.paid_cents,
            due_cents: due.cents(),
            note: input.note,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Partially updates a purchase header (PATCH semantics).
    ///
    /// A `status` change here is what drives the receipt gate: the deltas
    /// come from diffing old vs new status over the persisted items, so
    /// toggling `pending → received → pending` nets to exactly zero and
    /// re-asserting the current status moves nothing. Financials are
    /// resolved patch-over-persisted with `due` recomputed.
    pub async fn patch(&self, id: &str, patch: PurchasePatch) -> DbResult<Purchase> {
        validate_purchase_patch(&patch)?;

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase", id))?;

        if patch.is_empty() {
            return Ok(existing);
        }

        let items = sqlx::query_as::<_, PurchaseItem>(
            "SELECT * FROM purchase_items WHERE purchase_id = ?",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let new_status = patch.status.unwrap_or(existing.status);
        let (total, paid, due) = resolve_financials(
            Money::from_cents(existing.total_cents),
            Money::from_cents(existing.paid_cents),
            patch.total_cents.map(Money::from_cents),
            patch.paid_cents.map(Money::from_cents),
        );

        let date = patch.date.unwrap_or(existing.date);
        let payment_status = patch.payment_status.unwrap_or(existing.payment_status);
        let note = patch.note.clone().or_else(|| existing.note.clone());
        let now = Utc::now();

        debug!(
            id = %id,
            old_status = %existing.status.as_str(),
            new_status = %new_status.as_str(),
            "Patching purchase"
        );

        sqlx::query(
            r#"
            UPDATE purchases SET
                date = ?,
                status = ?,
                payment_status = ?,
                total_cents = ?,
                paid_cents = ?,
                due_cents = ?,
                note = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(date)
        .bind(new_status)
        .bind(payment_status)
        .bind(total.cents())
        .bind(paid.cents())
        .bind(due.cents())
        .bind(&note)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        for delta in net_deltas(transition_deltas(existing.status, new_status, &items)) {
            apply_stock_delta(&mut *tx, &delta.product_id, delta.delta.milli()).await?;
        }

        tx.commit().await?;

        Ok(Purchase {
            date,
            status: new_status,
            payment_status,
            total_cents: total.cents(),
            paid_cents: paid.cents(),
            due_cents: due.cents(),
            note,
            updated_at: now,
            ..existing
        })
    }

    /// Deletes a purchase, reversing its stock footprint first if the
    /// current status holds stock. Items cascade with the document.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting purchase");

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Purchase", id))?;

        let items = sqlx::query_as::<_, PurchaseItem>(
            "SELECT * FROM purchase_items WHERE purchase_id = ?",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for delta in net_deltas(purchase_reversal_deltas(existing.status, &items)) {
            apply_stock_delta(&mut *tx, &delta.product_id, delta.delta.milli()).await?;
        }

        sqlx::query("DELETE FROM purchases WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn ensure_supplier(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    supplier_id: &str,
) -> DbResult<()> {
    let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers WHERE id = ?")
        .bind(supplier_id)
        .fetch_one(&mut **tx)
        .await?;
    if exists == 0 {
        return Err(DbError::not_found("Supplier", supplier_id));
    }
    Ok(())
}

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

/// Checks the reference is not taken by another purchase. Backed by the
/// UNIQUE index - this check exists for the friendlier error.
async fn ensure_reference_free(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    reference: &str,
    exclude_id: Option<&str>,
) -> DbResult<()> {
    let taken: i64 = match exclude_id {
        Some(id) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE reference = ? AND id != ?")
                .bind(reference)
                .bind(id)
                .fetch_one(&mut **tx)
                .await?
        }
        None => sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE reference = ?")
            .bind(reference)
            .fetch_one(&mut **tx)
            .await?,
    };
    if taken > 0 {
        return Err(DbError::duplicate("reference", reference));
    }
    Ok(())
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    purchase_id: &str,
    input: &PurchaseInput,
    now: DateTime<Utc>,
) -> DbResult<()> {
    for item in &input.items {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE id = ?")
            .bind(&item.product_id)
            .fetch_one(&mut **tx)
            .await?;
        if exists == 0 {
            return Err(DbError::not_found("Product", &item.product_id));
        }

        sqlx::query(
            r#"
            INSERT INTO purchase_items (
                id, purchase_id, product_id, quantity_milli,
                unit_cost_cents, discount_cents, tax_cents, subtotal_cents,
                created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(purchase_id)
        .bind(&item.product_id)
        .bind(item.quantity_milli)
        .bind(item.unit_cost_cents)
        .bind(item.discount_cents)
        .bind(item.tax_cents)
        .bind(item.subtotal_cents)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil::{seed_basics, stock_of, test_db, test_date};
    use stockroom_core::types::PurchaseItemInput;

    fn input(
        supplier_id: &str,
        warehouse_id: &str,
        status: PurchaseStatus,
        items: Vec<PurchaseItemInput>,
    ) -> PurchaseInput {
        PurchaseInput {
            reference: None,
            supplier_id: supplier_id.to_string(),
            warehouse_id: warehouse_id.to_string(),
            date: test_date(),
            status,
            payment_status: PaymentStatus::Unpaid,
            subtotal_cents: 10_000,
            tax_rate_bps: 0,
            tax_cents: 0,
            discount_cents: 0,
            shipping_cents: 0,
            total_cents: 10_000,
            paid_cents: 2_000,
            note: None,
            items,
        }
    }

    fn item(product_id: &str, quantity_milli: i64) -> PurchaseItemInput {
        PurchaseItemInput {
            product_id: product_id.to_string(),
            quantity_milli,
            unit_cost_cents: 500,
            discount_cents: 0,
            tax_cents: 0,
            subtotal_cents: 1_500,
        }
    }

    #[tokio::test]
    async fn test_create_pending_leaves_stock_untouched() {
        let db = test_db().await;
        let (warehouse_id, supplier_id, product_id) = seed_basics(&db, 5_000).await;

        let purchase = db
            .purchases()
            .create(input(
                &supplier_id,
                &warehouse_id,
                PurchaseStatus::Pending,
                vec![item(&product_id, 3_000)],
            ))
            .await
            .unwrap();

        // Items are persisted, the ledger is not
        assert_eq!(stock_of(&db, &product_id).await, 5_000);
        assert_eq!(db.purchases().get_items(&purchase.id).await.unwrap().len(), 1);
        // due derived from total - paid
        assert_eq!(purchase.due_cents, 8_000);
    }

    #[tokio::test]
    async fn test_create_received_applies_stock() {
        let db = test_db().await;
        let (warehouse_id, supplier_id, product_id) = seed_basics(&db, 5_000).await;

        db.purchases()
            .create(input(
                &supplier_id,
                &warehouse_id,
                PurchaseStatus::Received,
                vec![item(&product_id, 3_000)],
            ))
            .await
            .unwrap();

        assert_eq!(stock_of(&db, &product_id).await, 8_000);
    }

    /// Full receipt lifecycle: pending holds nothing, receiving applies,
    /// cancelling reverses. Start and end stock are bit-identical.
    #[tokio::test]
    async fn test_receipt_lifecycle_round_trips() {
        let db = test_db().await;
        let (warehouse_id, supplier_id, product_id) = seed_basics(&db, 5_000).await;

        let purchase = db
            .purchases()
            .create(input(
                &supplier_id,
                &warehouse_id,
                PurchaseStatus::Pending,
                vec![item(&product_id, 3_000)],
            ))
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product_id).await, 5_000);

        let patched = db
            .purchases()
            .patch(
                &purchase.id,
                PurchasePatch {
                    status: Some(PurchaseStatus::Received),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.status, PurchaseStatus::Received);
        assert_eq!(stock_of(&db, &product_id).await, 8_000);

        db.purchases()
            .patch(
                &purchase.id,
                PurchasePatch {
                    status: Some(PurchaseStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product_id).await, 5_000);
    }

    /// An absent `note` in a patch keeps the stored note; only a present
    /// value replaces it.
    #[tokio::test]
    async fn test_patch_without_note_keeps_stored_note() {
        let db = test_db().await;
        let (warehouse_id, supplier_id, product_id) = seed_basics(&db, 0).await;

        let mut with_note = input(
            &supplier_id,
            &warehouse_id,
            PurchaseStatus::Pending,
            vec![item(&product_id, 1_000)],
        );
        with_note.note = Some("rush order".to_string());
        let purchase = db.purchases().create(with_note).await.unwrap();

        let patched = db
            .purchases()
            .patch(
                &purchase.id,
                PurchasePatch {
                    paid_cents: Some(5_000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.note.as_deref(), Some("rush order"));

        let stored = db
            .purchases()
            .get_by_id(&purchase.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.note.as_deref(), Some("rush order"));

        let patched = db
            .purchases()
            .patch(
                &purchase.id,
                PurchasePatch {
                    note: Some("rush order, confirmed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.note.as_deref(), Some("rush order, confirmed"));
    }

    #[tokio::test]
    async fn test_reasserting_status_moves_nothing() {
        let db = test_db().await;
        let (warehouse_id, supplier_id, product_id) = seed_basics(&db, 5_000).await;

        let purchase = db
            .purchases()
            .create(input(
                &supplier_id,
                &warehouse_id,
                PurchaseStatus::Received,
                vec![item(&product_id, 3_000)],
            ))
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product_id).await, 8_000);

        // received → received: no double application
        db.purchases()
            .patch(
                &purchase.id,
                PurchasePatch {
                    status: Some(PurchaseStatus::Received),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product_id).await, 8_000);

        // pending → ordered: both sides stockless
        db.purchases()
            .patch(
                &purchase.id,
                PurchasePatch {
                    status: Some(PurchaseStatus::Pending),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product_id).await, 5_000);
        db.purchases()
            .patch(
                &purchase.id,
                PurchasePatch {
                    status: Some(PurchaseStatus::Ordered),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product_id).await, 5_000);
    }

    #[tokio::test]
    async fn test_patch_financials_rederive_due() {
        let db = test_db().await;
        let (warehouse_id, supplier_id, product_id) = seed_basics(&db, 0).await;

        let purchase = db
            .purchases()
            .create(input(
                &supplier_id,
                &warehouse_id,
                PurchaseStatus::Pending,
                vec![item(&product_id, 1_000)],
            ))
            .await
            .unwrap();
        assert_eq!(purchase.due_cents, 8_000);

        // Raise paid only: total persists, due recomputes
        let patched = db
            .purchases()
            .patch(
                &purchase.id,
                PurchasePatch {
                    paid_cents: Some(10_000),
                    payment_status: Some(PaymentStatus::Paid),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.total_cents, 10_000);
        assert_eq!(patched.paid_cents, 10_000);
        assert_eq!(patched.due_cents, 0);
        assert_eq!(patched.payment_status, PaymentStatus::Paid);

        let stored = db
            .purchases()
            .get_by_id(&purchase.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.due_cents, stored.total_cents - stored.paid_cents);
    }

    #[tokio::test]
    async fn test_empty_patch_is_a_noop() {
        let db = test_db().await;
        let (warehouse_id, supplier_id, product_id) = seed_basics(&db, 0).await;

        let purchase = db
            .purchases()
            .create(input(
                &supplier_id,
                &warehouse_id,
                PurchaseStatus::Pending,
                vec![item(&product_id, 1_000)],
            ))
            .await
            .unwrap();

        let unchanged = db
            .purchases()
            .patch(&purchase.id, PurchasePatch::default())
            .await
            .unwrap();
        assert_eq!(unchanged.reference, purchase.reference);
        assert_eq!(unchanged.status, purchase.status);
        assert_eq!(unchanged.total_cents, purchase.total_cents);
        assert_eq!(unchanged.due_cents, purchase.due_cents);
    }

    #[tokio::test]
    async fn test_update_received_purchase_replaces_footprint() {
        let db = test_db().await;
        let (warehouse_id, supplier_id, product_id) = seed_basics(&db, 5_000).await;

        let purchase = db
            .purchases()
            .create(input(
                &supplier_id,
                &warehouse_id,
                PurchaseStatus::Received,
                vec![item(&product_id, 3_000)],
            ))
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product_id).await, 8_000);

        // Replace with a larger received quantity: -3.000 then +7.000
        db.purchases()
            .update(
                &purchase.id,
                input(
                    &supplier_id,
                    &warehouse_id,
                    PurchaseStatus::Received,
                    vec![item(&product_id, 7_000)],
                ),
            )
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product_id).await, 12_000);

        // Replace again, demoting to pending: old +7.000 reversed, nothing applied
        db.purchases()
            .update(
                &purchase.id,
                input(
                    &supplier_id,
                    &warehouse_id,
                    PurchaseStatus::Pending,
                    vec![item(&product_id, 7_000)],
                ),
            )
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product_id).await, 5_000);
    }

    #[tokio::test]
    async fn test_delete_reverses_only_received() {
        let db = test_db().await;
        let (warehouse_id, supplier_id, product_id) = seed_basics(&db, 5_000).await;

        let received = db
            .purchases()
            .create(input(
                &supplier_id,
                &warehouse_id,
                PurchaseStatus::Received,
                vec![item(&product_id, 3_000)],
            ))
            .await
            .unwrap();
        let pending = db
            .purchases()
            .create(input(
                &supplier_id,
                &warehouse_id,
                PurchaseStatus::Pending,
                vec![item(&product_id, 9_000)],
            ))
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product_id).await, 8_000);

        db.purchases().delete(&pending.id).await.unwrap();
        assert_eq!(stock_of(&db, &product_id).await, 8_000);

        db.purchases().delete(&received.id).await.unwrap();
        assert_eq!(stock_of(&db, &product_id).await, 5_000);

        let err = db.purchases().delete(&received.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_unknown_supplier_rejected() {
        let db = test_db().await;
        let (warehouse_id, _, product_id) = seed_basics(&db, 0).await;

        let err = db
            .purchases()
            .create(input(
                "00000000-0000-0000-0000-000000000000",
                &warehouse_id,
                PurchaseStatus::Pending,
                vec![item(&product_id, 1_000)],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_referenced_supplier_cannot_be_deleted() {
        let db = test_db().await;
        let (warehouse_id, supplier_id, product_id) = seed_basics(&db, 0).await;

        let purchase = db
            .purchases()
            .create(input(
                &supplier_id,
                &warehouse_id,
                PurchaseStatus::Pending,
                vec![item(&product_id, 1_000)],
            ))
            .await
            .unwrap();

        let err = db.suppliers().delete(&supplier_id).await.unwrap_err();
        assert!(matches!(err, DbError::ReferentialIntegrity { .. }));

        db.purchases().delete(&purchase.id).await.unwrap();
        db.suppliers().delete(&supplier_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = test_db().await;
        let (warehouse_id, supplier_id, product_id) = seed_basics(&db, 0).await;

        let mut received = input(
            &supplier_id,
            &warehouse_id,
            PurchaseStatus::Received,
            vec![item(&product_id, 1_000)],
        );
        received.reference = Some("PUR-RCV".to_string());
        db.purchases().create(received).await.unwrap();

        let mut pending = input(
            &supplier_id,
            &warehouse_id,
            PurchaseStatus::Pending,
            vec![item(&product_id, 1_000)],
        );
        pending.reference = Some("PUR-PND".to_string());
        db.purchases().create(pending).await.unwrap();

        let filter = PurchaseFilter {
            status: Some(PurchaseStatus::Received),
            ..Default::default()
        };
        let page = db
            .purchases()
            .list(&filter, &Pagination::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].reference, "PUR-RCV");

        let filter = PurchaseFilter {
            supplier_id: Some(supplier_id.clone()),
            search: Some("PND".to_string()),
            ..Default::default()
        };
        let page = db
            .purchases()
            .list(&filter, &Pagination::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].status, PurchaseStatus::Pending);
    }
}
