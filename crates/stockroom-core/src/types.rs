//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Adjustment    │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (unique)  │   │  reference (uq) │   │  reference (uq) │       │
//! │  │  stock_milli    │   │  warehouse_id   │   │  status         │       │
//! │  │  alert_quantity │   │  items[]        │   │  due_cents      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ AdjustmentType  │   │ PurchaseStatus  │   │ PaymentStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Addition       │   │  Pending        │   │  Unpaid         │       │
//! │  │  Subtraction    │   │  Ordered        │   │  Partial        │       │
//! │  └─────────────────┘   │  Received ★     │   │  Paid           │       │
//! │                        │  Cancelled      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │                        ★ only Received touches stock                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every document has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `reference`: human-readable unique identifier (ADJ-…, PUR-…),
//!   generated when the caller omits it

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Adjustment Type
// =============================================================================

/// Direction of an adjustment line item.
///
/// The document header carries a type as a UI hint, but the ledger takes
/// the direction **per item** - a single adjustment may mix additions and
/// subtractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// Stock goes up by the item quantity.
    Addition,
    /// Stock goes down by the item quantity.
    Subtraction,
}

impl Default for AdjustmentType {
    fn default() -> Self {
        AdjustmentType::Addition
    }
}

// =============================================================================
// Purchase Status
// =============================================================================

/// Lifecycle status of a purchase.
///
/// Stock effects are **status-gated**: items are recorded at any status,
/// but only `Received` has a ledger footprint. Every other status - and any
/// status added later - counts as "not received".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Ordered from supplier, goods not yet here.
    Pending,
    /// Confirmed with the supplier, in transit.
    Ordered,
    /// Goods arrived; stock has been incremented.
    Received,
    /// Called off; never counts toward stock.
    Cancelled,
}

impl PurchaseStatus {
    /// Whether this status contributes purchase item quantities to stock.
    ///
    /// This single predicate is the whole status gate: transitions are
    /// evaluated by comparing it for the old and new status (see
    /// [`crate::ledger::receipt_transition`]).
    #[inline]
    pub const fn affects_stock(&self) -> bool {
        matches!(self, PurchaseStatus::Received)
    }

    /// Stable lowercase name, matching the stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Ordered => "ordered",
            PurchaseStatus::Received => "received",
            PurchaseStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for PurchaseStatus {
    fn default() -> Self {
        PurchaseStatus::Pending
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// How much of a purchase has been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// `stock_milli` is the only cross-document shared mutable field in the
/// system. It is mutated exclusively through the ledger engine's atomic
/// increment - never read-then-written at the application layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product code - business identifier, unique.
    pub code: String,

    /// Barcode (EAN-13, UPC-A, etc.), unique when present.
    pub barcode: Option<String>,

    /// Display name.
    pub name: String,

    /// Selling price in cents.
    pub price_cents: i64,

    /// Cost in cents (for margin calculations).
    pub cost_cents: Option<i64>,

    /// Current stock in milliunits. Mutated only by the ledger engine.
    pub stock_milli: i64,

    /// Low-stock alert threshold in milliunits.
    pub alert_quantity_milli: i64,

    /// Whether product is active (hidden from catalogs when false).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the current stock level.
    #[inline]
    pub fn stock(&self) -> Quantity {
        Quantity::from_milli(self.stock_milli)
    }

    /// Returns the low-stock alert threshold.
    #[inline]
    pub fn alert_quantity(&self) -> Quantity {
        Quantity::from_milli(self.alert_quantity_milli)
    }

    /// Whether the product is at or below its alert threshold.
    ///
    /// Read-side only; the ledger itself never blocks on stock levels.
    pub fn is_low_stock(&self) -> bool {
        self.stock() <= self.alert_quantity()
    }
}

// =============================================================================
// Warehouse & Supplier (master data)
// =============================================================================

/// A physical stock location. Read-mostly reference data the ledger
/// validates against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A supplier purchases are placed with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Adjustment
// =============================================================================

/// A stock adjustment document.
///
/// Created with its items in one transaction; update replaces all items
/// (old deltas reversed, new applied); delete reverses deltas before the
/// rows go away.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Adjustment {
    pub id: String,
    /// Human-readable unique identifier (e.g., `ADJ-1700000000000`).
    pub reference: String,
    pub warehouse_id: String,
    pub date: NaiveDate,
    /// Document-level hint only; the ledger direction is taken per item.
    pub adjustment_type: AdjustmentType,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item of an adjustment. Owned exclusively by its document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AdjustmentItem {
    pub id: String,
    pub adjustment_id: String,
    pub product_id: String,
    /// Quantity in milliunits, always >= 0; direction comes from `item_type`.
    pub quantity_milli: i64,
    pub item_type: AdjustmentType,
    /// Stock level at the moment the item was applied - an audit snapshot,
    /// never re-derived.
    pub pre_stock_milli: i64,
    pub created_at: DateTime<Utc>,
}

impl AdjustmentItem {
    /// Returns the (unsigned) item quantity.
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    /// Returns the audited pre-application stock level.
    #[inline]
    pub fn pre_stock(&self) -> Quantity {
        Quantity::from_milli(self.pre_stock_milli)
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// A purchase document.
///
/// Invariant: `due_cents == total_cents - paid_cents` after every
/// successful write. Stock effects are gated on [`PurchaseStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    /// Human-readable unique identifier (e.g., `PUR-1700000000000`).
    pub reference: String,
    pub supplier_id: String,
    pub warehouse_id: String,
    pub date: NaiveDate,
    pub status: PurchaseStatus,
    pub payment_status: PaymentStatus,
    pub subtotal_cents: i64,
    /// Tax rate in basis points (825 = 8.25%).
    pub tax_rate_bps: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    pub paid_cents: i64,
    /// Derived: always `total_cents - paid_cents`. Never client-settable.
    pub due_cents: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Purchase {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the amount paid as Money.
    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_cents)
    }

    /// Returns the outstanding balance as Money.
    #[inline]
    pub fn due(&self) -> Money {
        Money::from_cents(self.due_cents)
    }

    /// Whether this purchase's items currently count toward stock.
    #[inline]
    pub fn is_received(&self) -> bool {
        self.status.affects_stock()
    }
}

/// A line item of a purchase. Owned exclusively by its document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseItem {
    pub id: String,
    pub purchase_id: String,
    pub product_id: String,
    /// Quantity in milliunits, always >= 0.
    pub quantity_milli: i64,
    pub unit_cost_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl PurchaseItem {
    /// Returns the item quantity.
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Input Payloads
// =============================================================================
// These are the validated write-side payloads the repositories consume.
// Full documents (above) are what the read side returns.

/// Payload for creating or fully replacing an adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentInput {
    /// Generated as `ADJ-<millis>` when absent.
    pub reference: Option<String>,
    pub warehouse_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub adjustment_type: AdjustmentType,
    pub note: Option<String>,
    pub items: Vec<AdjustmentItemInput>,
}

/// One line of an [`AdjustmentInput`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentItemInput {
    pub product_id: String,
    /// Unsigned quantity in milliunits; sign comes from `item_type`.
    pub quantity_milli: i64,
    pub item_type: AdjustmentType,
}

/// Payload for creating or fully replacing a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseInput {
    /// Generated as `PUR-<millis>` when absent.
    pub reference: Option<String>,
    pub supplier_id: String,
    pub warehouse_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: PurchaseStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub subtotal_cents: i64,
    #[serde(default)]
    pub tax_rate_bps: i64,
    #[serde(default)]
    pub tax_cents: i64,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub shipping_cents: i64,
    pub total_cents: i64,
    #[serde(default)]
    pub paid_cents: i64,
    pub note: Option<String>,
    pub items: Vec<PurchaseItemInput>,
}

/// One line of a [`PurchaseInput`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItemInput {
    pub product_id: String,
    pub quantity_milli: i64,
    pub unit_cost_cents: i64,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub tax_cents: i64,
    pub subtotal_cents: i64,
}

/// Partial header update for a purchase (PATCH semantics).
///
/// There is deliberately no `due` field: `due` is derived, never settable.
/// A `status` change here is what drives the status transition controller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchasePatch {
    pub date: Option<NaiveDate>,
    pub status: Option<PurchaseStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub total_cents: Option<i64>,
    pub paid_cents: Option<i64>,
    /// `None` keeps the stored note; PATCH cannot clear a note. Clearing
    /// one takes a full replace via `update`.
    pub note: Option<String>,
}

impl PurchasePatch {
    /// True when the patch carries nothing to write.
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.status.is_none()
            && self.payment_status.is_none()
            && self.total_cents.is_none()
            && self.paid_cents.is_none()
            && self.note.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_gate() {
        assert!(PurchaseStatus::Received.affects_stock());
        assert!(!PurchaseStatus::Pending.affects_stock());
        assert!(!PurchaseStatus::Ordered.affects_stock());
        assert!(!PurchaseStatus::Cancelled.affects_stock());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PurchaseStatus::default(), PurchaseStatus::Pending);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
        assert_eq!(AdjustmentType::default(), AdjustmentType::Addition);
    }

    #[test]
    fn test_low_stock() {
        let now = Utc::now();
        let product = Product {
            id: "p1".to_string(),
            code: "SKU-1".to_string(),
            barcode: None,
            name: "Widget".to_string(),
            price_cents: 1000,
            cost_cents: None,
            stock_milli: 2000,
            alert_quantity_milli: 5000,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(product.is_low_stock());
    }

    #[test]
    fn test_empty_patch() {
        assert!(PurchasePatch::default().is_empty());

        let patch = PurchasePatch {
            paid_cents: Some(500),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
