//! # Validation Module
//!
//! Input validation for document payloads and master data fields.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (out of scope here)                                │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Immediate caller feedback                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - payload & business rule validation             │
//! │  ├── Runs BEFORE the mutating transaction opens                        │
//! │  └── Existence/uniqueness is re-checked INSIDE the transaction         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (reference, code, barcode)                     │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_code, validate_item_quantity};
//!
//! // Validate a product code before database insert
//! validate_code("WIDGET-01").unwrap();
//!
//! // Validate an item quantity (milliunits) before applying deltas
//! validate_item_quantity(2500).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{AdjustmentInput, PurchaseInput, PurchasePatch};
use crate::{MAX_DOCUMENT_ITEMS, MAX_ITEM_QUANTITY_MILLI, MAX_REFERENCE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_code;
///
/// assert!(validate_code("WIDGET-01").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a document reference.
///
/// ## Rules
/// - Must not be empty (callers omit the field entirely to auto-generate)
/// - Maximum 50 characters
/// - Alphanumeric, hyphens, underscores
pub fn validate_reference(reference: &str) -> ValidationResult<()> {
    let reference = reference.trim();

    if reference.is_empty() {
        return Err(ValidationError::Required {
            field: "reference".to_string(),
        });
    }

    if reference.len() > MAX_REFERENCE_LEN {
        return Err(ValidationError::TooLong {
            field: "reference".to_string(),
            max: MAX_REFERENCE_LEN,
        });
    }

    if !reference
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "reference".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an entity display name (product, warehouse, supplier).
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity in milliunits.
///
/// ## Rules
/// - Must be strictly positive (> 0). A zero-quantity line carries no
///   ledger information and is rejected rather than stored; the schema
///   CHECK constraint enforces the same rule.
/// - Direction comes from the item type or the purchase status, never
///   from a signed quantity
/// - Must not exceed MAX_ITEM_QUANTITY_MILLI
pub fn validate_item_quantity(quantity_milli: i64) -> ValidationResult<()> {
    if quantity_milli <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity_milli > MAX_ITEM_QUANTITY_MILLI {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY_MILLI,
        });
    }

    Ok(())
}

/// Validates a monetary amount in cents that must not be negative
/// (prices, totals, paid amounts, shipping, discounts).
///
/// Zero is allowed: a fully-discounted purchase has total 0.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_tax_rate_bps(bps: i64) -> ValidationResult<()> {
    if !(0..=10000).contains(&bps) {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Document Payload Validators
// =============================================================================

/// Validates a full adjustment payload (create or replace).
///
/// ## What Is Checked Here
/// Field shape only. Warehouse/product existence and reference uniqueness
/// are re-checked inside the mutating transaction, where they are
/// race-free.
pub fn validate_adjustment_input(input: &AdjustmentInput) -> ValidationResult<()> {
    if let Some(reference) = &input.reference {
        validate_reference(reference)?;
    }
    validate_uuid("warehouse_id", &input.warehouse_id)?;

    if input.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }
    if input.items.len() > MAX_DOCUMENT_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_DOCUMENT_ITEMS as i64,
        });
    }

    for item in &input.items {
        validate_uuid("product_id", &item.product_id)?;
        validate_item_quantity(item.quantity_milli)?;
    }

    Ok(())
}

/// Validates a full purchase payload (create or replace).
pub fn validate_purchase_input(input: &PurchaseInput) -> ValidationResult<()> {
    if let Some(reference) = &input.reference {
        validate_reference(reference)?;
    }
    validate_uuid("supplier_id", &input.supplier_id)?;
    validate_uuid("warehouse_id", &input.warehouse_id)?;

    validate_amount_cents("subtotal", input.subtotal_cents)?;
    validate_tax_rate_bps(input.tax_rate_bps)?;
    validate_amount_cents("tax", input.tax_cents)?;
    validate_amount_cents("discount", input.discount_cents)?;
    validate_amount_cents("shipping", input.shipping_cents)?;
    validate_amount_cents("total", input.total_cents)?;
    validate_amount_cents("paid", input.paid_cents)?;

    if input.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }
    if input.items.len() > MAX_DOCUMENT_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_DOCUMENT_ITEMS as i64,
        });
    }

    for item in &input.items {
        validate_uuid("product_id", &item.product_id)?;
        validate_item_quantity(item.quantity_milli)?;
        validate_amount_cents("unit_cost", item.unit_cost_cents)?;
        validate_amount_cents("item discount", item.discount_cents)?;
        validate_amount_cents("item tax", item.tax_cents)?;
        validate_amount_cents("item subtotal", item.subtotal_cents)?;
    }

    Ok(())
}

/// Validates a purchase patch payload.
pub fn validate_purchase_patch(patch: &PurchasePatch) -> ValidationResult<()> {
    if let Some(total) = patch.total_cents {
        validate_amount_cents("total", total)?;
    }
    if let Some(paid) = patch.paid_cents {
        validate_amount_cents("paid", paid)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AdjustmentItemInput, AdjustmentType, PaymentStatus, PurchaseItemInput, PurchaseStatus,
    };
    use chrono::NaiveDate;

    const WAREHOUSE: &str = "550e8400-e29b-41d4-a716-446655440000";
    const SUPPLIER: &str = "550e8400-e29b-41d4-a716-446655440001";
    const PRODUCT: &str = "550e8400-e29b-41d4-a716-446655440002";

    fn adjustment_input() -> AdjustmentInput {
        AdjustmentInput {
            reference: None,
            warehouse_id: WAREHOUSE.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            adjustment_type: AdjustmentType::Addition,
            note: None,
            items: vec![AdjustmentItemInput {
                product_id: PRODUCT.to_string(),
                quantity_milli: 10_000,
                item_type: AdjustmentType::Addition,
            }],
        }
    }

    fn purchase_input() -> PurchaseInput {
        PurchaseInput {
            reference: None,
            supplier_id: SUPPLIER.to_string(),
            warehouse_id: WAREHOUSE.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            status: PurchaseStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            subtotal_cents: 1000,
            tax_rate_bps: 0,
            tax_cents: 0,
            discount_cents: 0,
            shipping_cents: 0,
            total_cents: 1000,
            paid_cents: 0,
            note: None,
            items: vec![PurchaseItemInput {
                product_id: PRODUCT.to_string(),
                quantity_milli: 3_000,
                unit_cost_cents: 333,
                discount_cents: 0,
                tax_cents: 0,
                subtotal_cents: 1000,
            }],
        }
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("WIDGET-01").is_ok());
        assert!(validate_code("abc_123").is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code("has space").is_err());
        assert!(validate_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_reference() {
        assert!(validate_reference("ADJ-1700000000000").is_ok());
        assert!(validate_reference("").is_err());
        assert!(validate_reference(&"R".repeat(60)).is_err());
        assert!(validate_reference("bad ref").is_err());
    }

    #[test]
    fn test_validate_item_quantity() {
        assert!(validate_item_quantity(1).is_ok());
        assert!(validate_item_quantity(10_000).is_ok());

        assert!(validate_item_quantity(0).is_err());
        assert!(validate_item_quantity(-500).is_err());
        assert!(validate_item_quantity(MAX_ITEM_QUANTITY_MILLI + 1).is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_amount_cents("total", 0).is_ok());
        assert!(validate_amount_cents("total", 1099).is_ok());
        assert!(validate_amount_cents("total", -1).is_err());

        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(825).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
        assert!(validate_tax_rate_bps(-1).is_err());
    }

    #[test]
    fn test_validate_adjustment_input() {
        assert!(validate_adjustment_input(&adjustment_input()).is_ok());

        let mut missing_items = adjustment_input();
        missing_items.items.clear();
        assert!(matches!(
            validate_adjustment_input(&missing_items),
            Err(ValidationError::Empty { .. })
        ));

        let mut bad_warehouse = adjustment_input();
        bad_warehouse.warehouse_id = "nope".to_string();
        assert!(validate_adjustment_input(&bad_warehouse).is_err());

        let mut zero_qty = adjustment_input();
        zero_qty.items[0].quantity_milli = 0;
        assert!(validate_adjustment_input(&zero_qty).is_err());
    }

    #[test]
    fn test_validate_purchase_input() {
        assert!(validate_purchase_input(&purchase_input()).is_ok());

        let mut negative_paid = purchase_input();
        negative_paid.paid_cents = -100;
        assert!(validate_purchase_input(&negative_paid).is_err());

        let mut no_items = purchase_input();
        no_items.items.clear();
        assert!(validate_purchase_input(&no_items).is_err());
    }

    #[test]
    fn test_validate_purchase_patch() {
        assert!(validate_purchase_patch(&PurchasePatch::default()).is_ok());

        let bad = PurchasePatch {
            paid_cents: Some(-1),
            ..Default::default()
        };
        assert!(validate_purchase_patch(&bad).is_err());
    }
}
