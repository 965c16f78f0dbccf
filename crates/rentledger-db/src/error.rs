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
//! │  DbError (this module) ← Classifies constraint / trigger failures      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Presentation layer ← Decides how to surface each kind                 │
//! │                       (modal message, inline hint, ...)                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error is recovered at the engine boundary and returned as a value;
//! none terminates the process. `StorageUnavailable` during initial
//! connection is the one condition a caller may reasonably treat as fatal
//! for its session.

use thiserror::Error;

pub use rentledger_core::error::ValidationError;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// A referenced row does not exist.
    ///
    /// ## When This Occurs
    /// - Inserting an item against a SKU or category that was never created
    /// - Checkout/checkin against an unknown item or customer
    /// - `lookup` of a connection name that was never registered
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Uniqueness violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate SKU number or inv_nr
    /// - Re-using a customer id
    /// - Registering a connection under an occupied name
    #[error("Duplicate {field}: '{value}' already exists")]
    Conflict { field: String, value: String },

    /// The item's derived custody state forbids the requested ledger append.
    ///
    /// ## When This Occurs
    /// - Checkout of an item that is already with a customer
    /// - Checkin of an item that is already in inventory
    ///
    /// This is a domain error, not a storage error: it is rejected before
    /// any row is written.
    #[error("item {inv_nr} is {status}, cannot {attempted}")]
    InvalidState {
        inv_nr: i64,
        status: String,
        attempted: String,
    },

    /// Attempted update or delete of an append-only row.
    ///
    /// Raised by the schema triggers guarding `customers`, `checkout`,
    /// `checkin` (and deletion of `categories`) - independent of caller
    /// discipline.
    #[error("{table} rows are append-only")]
    ImmutableViolation { table: String },

    /// Connection could not be opened or created.
    ///
    /// ## When This Occurs
    /// - Opening a missing file, or one without the RentLedger schema
    /// - Creating over an existing file (creation never overwrites)
    /// - I/O fault, pool exhausted or closed
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A multi-row operation could not be committed as a unit.
    /// Storage is guaranteed unchanged.
    #[error("atomic operation failed to commit: {0}")]
    AtomicityFailure(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Caller-supplied arguments failed validation before any SQL ran.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error.
    pub fn conflict(field: impl Into<String>, value: impl ToString) -> Self {
        DbError::Conflict {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// message contains "rows are append-only"   → DbError::ImmutableViolation
/// message contains "UNIQUE constraint"      → DbError::Conflict
/// message contains "FOREIGN KEY constraint" → DbError::NotFound
/// sqlx::Error::RowNotFound                  → DbError::NotFound
/// sqlx::Error::PoolTimedOut / PoolClosed    → DbError::StorageUnavailable
/// Other                                     → DbError::Internal
/// ```
///
/// The "rows are append-only" text comes from the RAISE(ABORT, ...) triggers
/// in the initial schema migration; the two must stay in sync.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if let Some(table) = msg.strip_suffix(" rows are append-only") {
                    DbError::ImmutableViolation {
                        table: table.to_string(),
                    }
                } else if msg.contains("UNIQUE constraint failed") {
                    // "UNIQUE constraint failed: <table>.<column>"
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::Conflict {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    // Backstop: the engine checks referents explicitly before
                    // inserting, so reaching the constraint means a reference
                    // went missing between statements.
                    DbError::NotFound {
                        entity: "referenced row".to_string(),
                        id: "unknown".to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::StorageUnavailable("connection pool exhausted".to_string())
            }

            sqlx::Error::PoolClosed => DbError::StorageUnavailable("pool is closed".to_string()),

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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors() {
        let err = DbError::not_found("SKU", 999);
        assert_eq!(err.to_string(), "SKU not found: 999");

        let err = DbError::conflict("inv_nr", 1);
        assert_eq!(err.to_string(), "Duplicate inv_nr: '1' already exists");
    }

    #[test]
    fn test_invalid_state_message() {
        let err = DbError::InvalidState {
            inv_nr: 1,
            status: "with customer".to_string(),
            attempted: "checkout".to_string(),
        };
        assert_eq!(err.to_string(), "item 1 is with customer, cannot checkout");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: DbError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
