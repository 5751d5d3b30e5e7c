//! Database migration command.
//!
//! Applies `crates/admin/migrations/` (schema `catalog`, including the
//! session table) to `CATALOG_DATABASE_URL`.

use super::{CommandError, connect};

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running catalog migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Catalog migrations complete!");
    Ok(())
}
