//! # Storage and Persistence
//!
//! SQLite connectivity and the persistence layer for accounts and secrets.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use crate::config::DatabaseConfig;

pub use migrations::{
    get_migration_version, list_applied_migrations, validate_migrations, MigrationInfo,
};
pub use pool::{create_pool, get_pool_stats, DbPool, PoolStats};
pub use repositories::{
    AccountRepository, SecretRepository, SqlxAccountRepository, SqlxSecretRepository,
};

use crate::errors::{PassKeeperError, Result};
use tracing::Instrument;

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    migrations::run_migrations(pool).await
}

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .instrument(crate::db_span!("check_connection"))
        .await
        .map_err(|e| PassKeeperError::database(e, "Database connectivity check failed"))?;

    Ok(())
}

/// In-memory database with migrations applied, for tests.
#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        auto_migrate: true,
        ..Default::default()
    };
    create_pool(&config).await.expect("in-memory pool")
}
