//! Database migration management.
//!
//! Migrations are embedded at compile time from the `migrations/` directory
//! and applied in filename order.

use crate::error::DbError;
use crate::DbPool;

/// Run all pending database migrations.
///
/// # Errors
///
/// Returns `DbError::MigrationFailed` if any migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(DbError::MigrationFailed)?;

    tracing::info!("Database migrations applied");
    Ok(())
}
