//! # stockroom-db: Database Layer for Stockroom
//!
//! This crate provides database access for the Stockroom back office.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stockroom Data Flow                               │
//! │                                                                         │
//! │  Caller (API layer, CLI, tests)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockroom-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐ │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │ (adjustment,   │    │  (embedded)  │ │   │
//! │  │   │               │    │  purchase,     │    │              │ │   │
//! │  │   │ SqlitePool    │◄───│  product, ...) │    │ 001_init.sql │ │   │
//! │  │   │ Connection    │    │                │    │ ...          │ │   │
//! │  │   │ Management    │    │                │    │              │ │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘ │   │
//! │  │                                │                               │   │
//! │  │          delta math, status gating: stockroom-core            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL mode, foreign keys on)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`query`] - Pagination primitives for list endpoints
//! - [`repository`] - Repository implementations (adjustment, purchase, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/db.sqlite")).await?;
//!
//! // Document mutations run as single transactions
//! let adjustment = db.adjustments().create(input).await?;
//!
//! // Reads
//! let page = db.purchases().list(&filter, &pagination).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod query;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};
pub use query::{Page, Pagination};

// Repository re-exports for convenience
pub use repository::adjustment::AdjustmentRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::warehouse::WarehouseRepository;
