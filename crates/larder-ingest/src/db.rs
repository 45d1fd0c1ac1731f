//! Database connection and schema

use crate::config::DatabaseConfig;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Embedded migrations from the workspace `migrations/` directory
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Open the run's database connection.
///
/// The import is strictly sequential, so the pool holds exactly one
/// connection for the whole run.
pub async fn create_pool(config: &DatabaseConfig) -> sqlx::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!("Database connection established");

    Ok(pool)
}

/// Bring the catalog schema up to date
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
