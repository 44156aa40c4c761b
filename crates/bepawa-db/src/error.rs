//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error ──────────┐                                                │
//! │                        ├──► DbError (this module)                       │
//! │  CoreError ────────────┘         │                                      │
//! │  (stock, transitions)            ▼                                      │
//! │                              ApiError (apps/api) ──► {code, message}    │
//! │                                                                         │
//! │  "no such table" / 42P01 ──► TableMissing ──► "Please contact support" │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bepawa_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found (or not visible to the caller).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (negative stock, bad enum text, ...).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// The table backing a feature doesn't exist in this deployment.
    ///
    /// ## When This Occurs
    /// - SQLite: `no such table: purchase_orders`
    /// - Postgres: SQLSTATE `42P01` (undefined_table)
    #[error("{} is not available. Please contact support.", feature_name(.table))]
    TableMissing { table: String },

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

    /// A business rule rejected the write.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// "purchase_orders" → "The purchase orders feature".
fn feature_name(table: &str) -> String {
    let readable = table.trim_matches('"').replace('_', " ");
    if readable.is_empty() {
        "This feature".to_string()
    } else {
        format!("The {readable} feature")
    }
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

    /// Whether the error is a missing table.
    pub fn is_table_missing(&self) -> bool {
        matches!(self, DbError::TableMissing { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → classify by SQLSTATE / message
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                let code = db_err.code();

                if let Some(table) = msg.strip_prefix("no such table: ") {
                    DbError::TableMissing {
                        table: table.to_string(),
                    }
                } else if code.as_deref() == Some("42P01") {
                    // relation "purchase_orders" does not exist
                    let table = msg.split('"').nth(1).unwrap_or("").to_string();
                    DbError::TableMissing { table }
                } else if msg.contains("UNIQUE constraint failed") {
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
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
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
    use crate::pool::{Database, DbConfig};

    #[test]
    fn test_table_missing_message() {
        let err = DbError::TableMissing {
            table: "purchase_orders".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "The purchase orders feature is not available. Please contact support."
        );
    }

    #[tokio::test]
    async fn test_missing_table_is_classified() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err: DbError = sqlx::query("SELECT * FROM prescriptions")
            .fetch_all(db.pool())
            .await
            .map(|_| ())
            .unwrap_err()
            .into();

        assert!(err.is_table_missing());
        assert!(err.to_string().contains("Please contact support"));
    }

    #[test]
    fn test_domain_errors_pass_through() {
        let err: DbError = CoreError::EmptyCart.into();
        assert_eq!(err.to_string(), "Cart is empty");
    }
}
