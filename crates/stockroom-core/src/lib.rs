//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! This crate is the **heart** of Stockroom. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stockroom Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Transport / Back-Office Surfaces                   │   │
//! │  │   REST handlers ── dashboards ── PDF ── fiscal device client    │   │
//! │  │                  (external collaborators)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockroom-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │money/qty  │  │  ledger   │  │ validation│  │   │
//! │  │   │ Adjustment│  │   Money   │  │  deltas   │  │   rules   │  │   │
//! │  │   │ Purchase  │  │ Quantity  │  │ statuses  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockroom-db (Database Layer)                  │   │
//! │  │          SQLite transactions, migrations, repositories          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Adjustment, Purchase, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`quantity`] - Fixed-point stock quantities (three decimal places)
//! - [`ledger`] - Stock delta derivation and status transition rules
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Arithmetic**: Money in cents (i64), quantities in milliunits (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::ledger;
//! use stockroom_core::quantity::Quantity;
//! use stockroom_core::types::AdjustmentType;
//!
//! // A subtraction item removes stock
//! let delta = ledger::adjustment_delta(AdjustmentType::Subtraction, Quantity::from_units(10));
//! assert_eq!(delta, -Quantity::from_units(10));
//!
//! // Reversal is simply the negated delta
//! assert_eq!(delta + (-delta), Quantity::zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod quantity;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use stockroom_core::Money` instead of
// `use stockroom_core::money::Money`

pub use error::ValidationError;
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single document (adjustment or purchase)
///
/// ## Business Reason
/// Bounds the work done inside one transaction; a document's deltas are
/// applied within a single atomic unit, so runaway item lists would turn
/// into long critical sections.
pub const MAX_DOCUMENT_ITEMS: usize = 100;

/// Maximum quantity of a single line item, in milliunits (1,000,000 units)
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 100000 instead of 100).
/// Can be made configurable per installation in future versions.
pub const MAX_ITEM_QUANTITY_MILLI: i64 = 1_000_000_000;

/// Maximum length of a document reference (e.g., `ADJ-1700000000000`)
pub const MAX_REFERENCE_LEN: usize = 50;
