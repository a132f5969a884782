//! # Ledger Module
//!
//! Pure stock-delta derivation: the rules that decide **how much** a
//! product's stock changes and **when**. Applying the deltas (the atomic
//! `stock = stock + ?` increment) lives in stockroom-db; everything here is
//! deterministic arithmetic over document items.
//!
//! ## The Three Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ledger Delta Rules                               │
//! │                                                                         │
//! │  1. Adjustment item                                                     │
//! │     addition    → +quantity                                             │
//! │     subtraction → −quantity                                             │
//! │                                                                         │
//! │  2. Purchase item (status-gated)                                        │
//! │     status affects stock (received) → +quantity                         │
//! │     any other status                → no delta at all                   │
//! │                                                                         │
//! │  3. Reversal                                                            │
//! │     reverse(delta) == −delta, always. Edits and deletes fully undo      │
//! │     a document's prior footprint before applying anything new.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Transitions
//! ```text
//! old status      new status      ledger effect over existing items
//! ─────────────   ─────────────   ─────────────────────────────────
//! pending         received        apply  (+quantity each, once)
//! received        pending/etc.    reverse (−quantity each, once)
//! received        received        nothing
//! pending         cancelled       nothing (neither side holds stock)
//! ```
//! One function - [`receipt_transition`] - makes this decision for every
//! caller (create, full update, patch, delete), so the gate can never
//! drift between code paths.

use std::collections::BTreeMap;

use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{
    AdjustmentItem, AdjustmentItemInput, AdjustmentType, PurchaseItem, PurchaseItemInput,
    PurchaseStatus,
};

// =============================================================================
// Stock Delta
// =============================================================================

/// A signed quantity to apply to one product's stock.
///
/// The unit of work of the ledger engine: every document mutation reduces
/// to a list of these, applied inside the document's transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDelta {
    pub product_id: String,
    pub delta: Quantity,
}

impl StockDelta {
    pub fn new(product_id: impl Into<String>, delta: Quantity) -> Self {
        StockDelta {
            product_id: product_id.into(),
            delta,
        }
    }

    /// The exact inverse of this delta.
    pub fn reversed(&self) -> StockDelta {
        StockDelta {
            product_id: self.product_id.clone(),
            delta: -self.delta,
        }
    }
}

// =============================================================================
// Adjustment Direction
// =============================================================================

/// Derives the signed delta of a single adjustment item.
///
/// ## Example
/// ```rust
/// use stockroom_core::ledger::adjustment_delta;
/// use stockroom_core::quantity::Quantity;
/// use stockroom_core::types::AdjustmentType;
///
/// let qty = Quantity::from_units(10);
/// assert_eq!(adjustment_delta(AdjustmentType::Addition, qty), qty);
/// assert_eq!(adjustment_delta(AdjustmentType::Subtraction, qty), -qty);
/// ```
#[inline]
pub fn adjustment_delta(item_type: AdjustmentType, quantity: Quantity) -> Quantity {
    match item_type {
        AdjustmentType::Addition => quantity,
        AdjustmentType::Subtraction => -quantity,
    }
}

/// Deltas for applying a new set of adjustment items.
pub fn adjustment_input_deltas(items: &[AdjustmentItemInput]) -> Vec<StockDelta> {
    items
        .iter()
        .map(|item| {
            StockDelta::new(
                item.product_id.clone(),
                adjustment_delta(item.item_type, Quantity::from_milli(item.quantity_milli)),
            )
        })
        .collect()
}

/// Deltas for reversing a persisted set of adjustment items.
///
/// Used by update (undo the old set before applying the new) and delete.
pub fn adjustment_reversal_deltas(items: &[AdjustmentItem]) -> Vec<StockDelta> {
    items
        .iter()
        .map(|item| {
            StockDelta::new(
                item.product_id.clone(),
                -adjustment_delta(item.item_type, item.quantity()),
            )
        })
        .collect()
}

// =============================================================================
// Purchase Receipts (status-gated)
// =============================================================================

/// Deltas for recording a new set of purchase items under `status`.
///
/// Returns an empty list unless the status holds stock - items are always
/// persisted, but the ledger only moves when the document is received.
pub fn purchase_input_deltas(status: PurchaseStatus, items: &[PurchaseItemInput]) -> Vec<StockDelta> {
    if !status.affects_stock() {
        return Vec::new();
    }
    items
        .iter()
        .map(|item| {
            StockDelta::new(
                item.product_id.clone(),
                Quantity::from_milli(item.quantity_milli),
            )
        })
        .collect()
}

/// Deltas for reversing a persisted set of purchase items under `status`.
pub fn purchase_reversal_deltas(status: PurchaseStatus, items: &[PurchaseItem]) -> Vec<StockDelta> {
    if !status.affects_stock() {
        return Vec::new();
    }
    items
        .iter()
        .map(|item| StockDelta::new(item.product_id.clone(), -item.quantity()))
        .collect()
}

// =============================================================================
// Status Transition Controller
// =============================================================================

/// The ledger-relevant outcome of a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptTransition {
    /// Crossing into a stock-holding status: apply +quantity per item once.
    Apply,
    /// Leaving a stock-holding status: apply −quantity per item once.
    Reverse,
    /// No stock boundary crossed (same status, or both sides stockless).
    None,
}

/// Diffs two purchase statuses into a ledger decision.
///
/// ## Why One Function
/// The original system re-derived this in every handler, and the copies
/// drifted. Here create, update, patch, and delete all ask the same
/// question the same way.
///
/// ## Example
/// ```rust
/// use stockroom_core::ledger::{receipt_transition, ReceiptTransition};
/// use stockroom_core::types::PurchaseStatus::*;
///
/// assert_eq!(receipt_transition(Pending, Received), ReceiptTransition::Apply);
/// assert_eq!(receipt_transition(Received, Cancelled), ReceiptTransition::Reverse);
/// assert_eq!(receipt_transition(Received, Received), ReceiptTransition::None);
/// assert_eq!(receipt_transition(Pending, Ordered), ReceiptTransition::None);
/// ```
pub fn receipt_transition(old: PurchaseStatus, new: PurchaseStatus) -> ReceiptTransition {
    match (old.affects_stock(), new.affects_stock()) {
        (false, true) => ReceiptTransition::Apply,
        (true, false) => ReceiptTransition::Reverse,
        _ => ReceiptTransition::None,
    }
}

/// Deltas produced by moving a purchase from `old` to `new` status, given
/// its currently persisted items.
///
/// Toggling `pending → received → pending` therefore nets to exactly zero.
pub fn transition_deltas(
    old: PurchaseStatus,
    new: PurchaseStatus,
    items: &[PurchaseItem],
) -> Vec<StockDelta> {
    match receipt_transition(old, new) {
        ReceiptTransition::Apply => items
            .iter()
            .map(|item| StockDelta::new(item.product_id.clone(), item.quantity()))
            .collect(),
        ReceiptTransition::Reverse => items
            .iter()
            .map(|item| StockDelta::new(item.product_id.clone(), -item.quantity()))
            .collect(),
        ReceiptTransition::None => Vec::new(),
    }
}

// =============================================================================
// Per-Product Netting
// =============================================================================

/// Folds a delta list into one signed delta per product.
///
/// ## Why Net?
/// A document may hold several items for the same product. Applying them
/// as independent increments is correct arithmetically but performs
/// needless row updates and, in the original system, raced against itself
/// when items were applied concurrently. Netting yields one serialized
/// increment per product; BTreeMap keeps the application order
/// deterministic. Zero nets are dropped entirely.
pub fn net_deltas(deltas: Vec<StockDelta>) -> Vec<StockDelta> {
    let mut by_product: BTreeMap<String, Quantity> = BTreeMap::new();
    for d in deltas {
        *by_product.entry(d.product_id).or_insert_with(Quantity::zero) += d.delta;
    }
    by_product
        .into_iter()
        .filter(|(_, delta)| !delta.is_zero())
        .map(|(product_id, delta)| StockDelta { product_id, delta })
        .collect()
}

// =============================================================================
// Financial Derivation
// =============================================================================

/// Derives the outstanding balance: `due = total − paid`.
///
/// `due` is never accepted from a caller; it exists only as the output of
/// this function.
#[inline]
pub fn derive_due(total: Money, paid: Money) -> Money {
    total - paid
}

/// Resolves the financial triple for a partial update.
///
/// Each side uses the patch value where provided and the persisted value
/// otherwise; `due` is recomputed from the result. Returns
/// `(total, paid, due)`.
///
/// ## Example
/// ```rust
/// use stockroom_core::ledger::resolve_financials;
/// use stockroom_core::money::Money;
///
/// // Persisted: total $100.00, paid $20.00. Patch raises paid to $50.00.
/// let (total, paid, due) = resolve_financials(
///     Money::from_cents(10000),
///     Money::from_cents(2000),
///     None,
///     Some(Money::from_cents(5000)),
/// );
/// assert_eq!(total.cents(), 10000);
/// assert_eq!(paid.cents(), 5000);
/// assert_eq!(due.cents(), 5000);
/// ```
pub fn resolve_financials(
    current_total: Money,
    current_paid: Money,
    new_total: Option<Money>,
    new_paid: Option<Money>,
) -> (Money, Money, Money) {
    let total = new_total.unwrap_or(current_total);
    let paid = new_paid.unwrap_or(current_paid);
    (total, paid, derive_due(total, paid))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PurchaseStatus::*;
    use chrono::Utc;

    fn adj_item(product_id: &str, qty_milli: i64, item_type: AdjustmentType) -> AdjustmentItem {
        AdjustmentItem {
            id: "item".to_string(),
            adjustment_id: "adj".to_string(),
            product_id: product_id.to_string(),
            quantity_milli: qty_milli,
            item_type,
            pre_stock_milli: 0,
            created_at: Utc::now(),
        }
    }

    fn pur_item(product_id: &str, qty_milli: i64) -> PurchaseItem {
        PurchaseItem {
            id: "item".to_string(),
            purchase_id: "pur".to_string(),
            product_id: product_id.to_string(),
            quantity_milli: qty_milli,
            unit_cost_cents: 100,
            discount_cents: 0,
            tax_cents: 0,
            subtotal_cents: 100,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_adjustment_direction() {
        let qty = Quantity::from_units(10);
        assert_eq!(adjustment_delta(AdjustmentType::Addition, qty), qty);
        assert_eq!(adjustment_delta(AdjustmentType::Subtraction, qty), -qty);
    }

    #[test]
    fn test_reversal_negates_input_deltas() {
        let inputs = vec![
            AdjustmentItemInput {
                product_id: "p1".to_string(),
                quantity_milli: 5000,
                item_type: AdjustmentType::Addition,
            },
            AdjustmentItemInput {
                product_id: "p2".to_string(),
                quantity_milli: 3000,
                item_type: AdjustmentType::Subtraction,
            },
        ];
        let persisted = vec![
            adj_item("p1", 5000, AdjustmentType::Addition),
            adj_item("p2", 3000, AdjustmentType::Subtraction),
        ];

        let applied = adjustment_input_deltas(&inputs);
        let reversed = adjustment_reversal_deltas(&persisted);

        for (a, r) in applied.iter().zip(reversed.iter()) {
            assert_eq!(a.product_id, r.product_id);
            assert_eq!(a.delta, -r.delta);
        }
    }

    #[test]
    fn test_purchase_deltas_are_status_gated() {
        let inputs = vec![PurchaseItemInput {
            product_id: "p1".to_string(),
            quantity_milli: 3000,
            unit_cost_cents: 100,
            discount_cents: 0,
            tax_cents: 0,
            subtotal_cents: 300,
        }];

        assert!(purchase_input_deltas(Pending, &inputs).is_empty());
        assert!(purchase_input_deltas(Cancelled, &inputs).is_empty());

        let received = purchase_input_deltas(Received, &inputs);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].delta, Quantity::from_milli(3000));

        let items = vec![pur_item("p1", 3000)];
        assert!(purchase_reversal_deltas(Pending, &items).is_empty());
        assert_eq!(
            purchase_reversal_deltas(Received, &items)[0].delta,
            Quantity::from_milli(-3000)
        );
    }

    #[test]
    fn test_receipt_transition_matrix() {
        // Into received: apply
        assert_eq!(receipt_transition(Pending, Received), ReceiptTransition::Apply);
        assert_eq!(receipt_transition(Ordered, Received), ReceiptTransition::Apply);
        assert_eq!(receipt_transition(Cancelled, Received), ReceiptTransition::Apply);

        // Out of received: reverse
        assert_eq!(receipt_transition(Received, Pending), ReceiptTransition::Reverse);
        assert_eq!(receipt_transition(Received, Cancelled), ReceiptTransition::Reverse);

        // No boundary crossed
        assert_eq!(receipt_transition(Received, Received), ReceiptTransition::None);
        assert_eq!(receipt_transition(Pending, Pending), ReceiptTransition::None);
        assert_eq!(receipt_transition(Pending, Ordered), ReceiptTransition::None);
        assert_eq!(receipt_transition(Cancelled, Pending), ReceiptTransition::None);
    }

    #[test]
    fn test_transition_round_trip_nets_zero() {
        let items = vec![pur_item("p1", 3000), pur_item("p2", 1500)];

        let mut all = transition_deltas(Pending, Received, &items);
        all.extend(transition_deltas(Received, Pending, &items));

        assert!(net_deltas(all).is_empty());
    }

    #[test]
    fn test_netting_merges_same_product() {
        let deltas = vec![
            StockDelta::new("p1", Quantity::from_milli(2000)),
            StockDelta::new("p1", Quantity::from_milli(-500)),
            StockDelta::new("p2", Quantity::from_milli(1000)),
            StockDelta::new("p3", Quantity::from_milli(700)),
            StockDelta::new("p3", Quantity::from_milli(-700)),
        ];

        let netted = net_deltas(deltas);
        assert_eq!(netted.len(), 2);
        assert_eq!(netted[0].product_id, "p1");
        assert_eq!(netted[0].delta, Quantity::from_milli(1500));
        assert_eq!(netted[1].product_id, "p2");
        assert_eq!(netted[1].delta, Quantity::from_milli(1000));
    }

    #[test]
    fn test_derive_due() {
        assert_eq!(
            derive_due(Money::from_cents(10000), Money::from_cents(2500)).cents(),
            7500
        );
        // Overpayment: due goes negative, not clamped
        assert_eq!(
            derive_due(Money::from_cents(1000), Money::from_cents(1500)).cents(),
            -500
        );
    }

    #[test]
    fn test_resolve_financials() {
        let total = Money::from_cents(10000);
        let paid = Money::from_cents(2000);

        // Nothing supplied: recompute from persisted values
        let (t, p, d) = resolve_financials(total, paid, None, None);
        assert_eq!((t.cents(), p.cents(), d.cents()), (10000, 2000, 8000));

        // Only total changes
        let (t, p, d) = resolve_financials(total, paid, Some(Money::from_cents(12000)), None);
        assert_eq!((t.cents(), p.cents(), d.cents()), (12000, 2000, 10000));

        // Both change
        let (t, p, d) = resolve_financials(
            total,
            paid,
            Some(Money::from_cents(12000)),
            Some(Money::from_cents(12000)),
        );
        assert_eq!((t.cents(), p.cents(), d.cents()), (12000, 12000, 0));
    }
}
