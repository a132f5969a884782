//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller (API layer, CLI, tests)                                        │
//! │                                                                         │
//! │  Validation failures short-circuit BEFORE any transaction opens;       │
//! │  constraint violations inside a transaction roll the whole document    │
//! │  mutation back.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use thiserror::Error;

use stockroom_core::error::ValidationError;

/// Dependent relations blocking a master-data deletion, with row counts.
///
/// Formatted into the error message so a caller can tell the user exactly
/// what stands in the way (e.g. `2 adjustment item(s), 1 purchase item(s)`).
#[derive(Debug, Clone)]
pub struct BlockingRelations(pub Vec<(String, i64)>);

impl fmt::Display for BlockingRelations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (relation, count) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{} {}(s)", count, relation)?;
            first = false;
        }
        Ok(())
    }
}

impl BlockingRelations {
    /// True when no dependent rows exist and the deletion may proceed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Payload failed validation; nothing was written.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    /// - A line item references a missing product (checked inside the
    ///   document transaction)
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate product code or barcode
    /// - Duplicate document reference
    /// - Any UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a non-existent warehouse_id / supplier_id / product_id
    ///   that slipped past the in-transaction existence checks
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Deletion refused because dependent records exist.
    ///
    /// The referential guard enumerates every blocking relation rather than
    /// failing on the first, so the caller sees the full picture at once.
    #[error("Cannot delete {entity} {id}: referenced by {blocking}")]
    ReferentialIntegrity {
        entity: String,
        id: String,
        blocking: BlockingRelations,
    },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a ReferentialIntegrity refusal.
    pub fn referenced(
        entity: impl Into<String>,
        id: impl Into<String>,
        blocking: Vec<(String, i64)>,
    ) -> Self {
        DbError::ReferentialIntegrity {
            entity: entity.into(),
            id: id.into(),
            blocking: BlockingRelations(blocking),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referential_integrity_message() {
        let err = DbError::referenced(
            "Product",
            "p1",
            vec![
                ("adjustment item".to_string(), 2),
                ("purchase item".to_string(), 1),
            ],
        );
        assert_eq!(
            err.to_string(),
            "Cannot delete Product p1: referenced by 2 adjustment item(s), 1 purchase item(s)"
        );
    }

    #[test]
    fn test_validation_error_converts() {
        let err: DbError = ValidationError::Required {
            field: "warehouse_id".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
