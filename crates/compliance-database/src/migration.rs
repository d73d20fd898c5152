//! Database migration runner.
//!
//! Version bookkeeping is left to sqlx's `_sqlx_migrations` table.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use compliance_core::error::{AppError, ErrorKind};
use compliance_core::result::AppResult;

/// Migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!(
        available = MIGRATOR.iter().count(),
        "Running database migrations..."
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Database migrations completed successfully");
    Ok(())
}
