//! Error types for the tessera-db crate.

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to establish or acquire a database connection.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    /// A database query failed to execute.
    #[error("Query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl DbError {
    /// Check if this error indicates a unique-constraint violation.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::QueryFailed(sqlx::Error::Database(db)) => {
                db.code().as_deref() == Some("23505")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = DbError::NotFound("Application slug=crm".to_string());
        assert_eq!(err.to_string(), "Not found: Application slug=crm");
    }

    #[test]
    fn test_query_failed_from_sqlx() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::QueryFailed(_)));
        assert!(!err.is_unique_violation());
    }
}
