//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │                                                                 │
//! │       │  db.adjustments().create(input)                                │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  AdjustmentRepository                                                  │
//! │  ├── create(&self, input)      ← validate, open tx, write, apply       │
//! │  ├── get_detail(&self, id)       deltas, commit                        │
//! │  ├── update(&self, id, input)                                          │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL (one transaction per document mutation)                    │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • The transaction choreography lives in exactly one place per         │
//! │    document kind                                                       │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD, stock reads, guarded delete
//! - [`warehouse::WarehouseRepository`] - Warehouse master data
//! - [`supplier::SupplierRepository`] - Supplier master data
//! - [`adjustment::AdjustmentRepository`] - Adjustment documents + ledger effects
//! - [`purchase::PurchaseRepository`] - Purchase documents + status-gated ledger

pub mod adjustment;
pub mod product;
pub mod purchase;
pub mod supplier;
pub mod warehouse;

/// Generates a document reference: `{PREFIX}-{unix millis}`.
///
/// Callers may supply their own reference instead; this is only the
/// fallback when the payload omits one. Uniqueness is still enforced by
/// the in-transaction check plus the UNIQUE index.
pub(crate) fn generate_reference(prefix: &str) -> String {
    format!("{}-{}", prefix, chrono::Utc::now().timestamp_millis())
}

// =============================================================================
// Shared Test Fixtures
// =============================================================================
