//! # Database Connection Pool Management
//!
//! Provides database connection pool creation and management utilities.

use crate::config::DatabaseConfig;
use crate::errors::{PassKeeperError, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::{path::Path, str::FromStr, time::Duration};

/// Type alias for the database connection pool
pub type DbPool = Pool<Sqlite>;

const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a database connection pool with the specified configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    validate_config(config)?;

    // Every connection to `:memory:` opens its own empty database
    let max_connections = if config.is_in_memory() { 1 } else { config.max_connections };
    let min_connections = config.min_connections.min(max_connections);

    let pool_options = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(min_connections)
        .acquire_timeout(config.connect_timeout())
        .test_before_acquire(true);

    let pool_options = match config.idle_timeout() {
        Some(idle_timeout) if !config.is_in_memory() => pool_options.idle_timeout(idle_timeout),
        _ => pool_options.idle_timeout(None).max_lifetime(None),
    };

    let mut connect_options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| {
            PassKeeperError::database(
                e,
                format!("Invalid SQLite connection string: {}", sanitize_url(&config.url)),
            )
        })?
        .create_if_missing(true)
        .busy_timeout(SQLITE_BUSY_TIMEOUT);

    if !config.is_in_memory() {
        ensure_parent_dir(connect_options.get_filename())?;
        connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = pool_options.connect_with(connect_options).await.map_err(|e| {
        tracing::error!(
            error = %e,
            url = %sanitize_url(&config.url),
            busy_timeout_ms = SQLITE_BUSY_TIMEOUT.as_millis(),
            "Failed to create SQLite database pool"
        );
        PassKeeperError::database(
            e,
            format!("Failed to connect to database: {}", sanitize_url(&config.url)),
        )
    })?;

    tracing::info!(
        max_connections,
        min_connections,
        in_memory = config.is_in_memory(),
        connect_timeout_ms = config.connect_timeout().as_millis(),
        idle_timeout_ms = config.idle_timeout().map(|d| d.as_millis()),
        "Database connection pool created"
    );

    if config.auto_migrate {
        tracing::info!("Auto-migration enabled, running database migrations");
        crate::storage::migrations::run_migrations(&pool).await?;
    }

    Ok(pool)
}

/// Validate database configuration
fn validate_config(config: &DatabaseConfig) -> Result<()> {
    if config.max_connections == 0 {
        return Err(PassKeeperError::validation("max_connections must be greater than 0"));
    }

    if config.min_connections > config.max_connections {
        return Err(PassKeeperError::validation(
            "min_connections cannot be greater than max_connections",
        ));
    }

    if config.url.is_empty() {
        return Err(PassKeeperError::validation("database URL cannot be empty"));
    }

    if !config.is_sqlite() {
        return Err(PassKeeperError::validation("database URL must start with 'sqlite:'"));
    }

    Ok(())
}

fn ensure_parent_dir(filename: &Path) -> Result<()> {
    match filename.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|e| PassKeeperError::Io {
                source: e,
                context: format!("Failed to create database directory {}", parent.display()),
            })
        }
        _ => Ok(()),
    }
}

/// Sanitize database URL for logging (remove credentials and query parameters)
fn sanitize_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) if parsed.password().is_some() || !parsed.username().is_empty() => format!(
            "{}://***:***@{}{}",
            parsed.scheme(),
            parsed.host_str().unwrap_or("unknown"),
            parsed.path()
        ),
        Ok(parsed) if parsed.query().is_some() => {
            let mut stripped = parsed.clone();
            stripped.set_query(None);
            stripped.to_string()
        }
        _ => url.to_string(),
    }
}

/// Get pool statistics for monitoring
pub fn get_pool_stats(pool: &DbPool) -> PoolStats {
    PoolStats { size: pool.size(), idle: pool.num_idle() }
}

/// Pool statistics for monitoring
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Total connections in the pool
    pub size: u32,
    /// Number of idle connections
    pub idle: usize,
}

impl PoolStats {
    /// Get the number of active connections
    pub fn active(&self) -> u32 {
        self.size.saturating_sub(self.idle as u32)
    }

    /// Check if the pool is healthy (has available connections)
    pub fn is_healthy(&self) -> bool {
        self.size > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 3,
            min_connections: 1,
            auto_migrate: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_config_valid() {
        let config = DatabaseConfig {
            url: "sqlite://./test.db".to_string(),
            max_connections: 10,
            min_connections: 2,
            ..Default::default()
        };

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_rejects_bad_bounds() {
        let config = DatabaseConfig { max_connections: 0, ..memory_config() };
        assert!(validate_config(&config).is_err());

        let config = DatabaseConfig { max_connections: 5, min_connections: 10, ..memory_config() };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_rejects_bad_urls() {
        let config = DatabaseConfig { url: "".to_string(), ..memory_config() };
        assert!(validate_config(&config).is_err());

        let config =
            DatabaseConfig { url: "postgresql://localhost/test".to_string(), ..memory_config() };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_sanitize_url() {
        assert_eq!(sanitize_url("sqlite://./test.db"), "sqlite://./test.db");
        assert_eq!(sanitize_url("sqlite://data.db?mode=rwc"), "sqlite://data.db");
        assert_eq!(sanitize_url("invalid-url"), "invalid-url");
    }

    #[test]
    fn test_pool_stats() {
        let stats = PoolStats { size: 10, idle: 3 };
        assert_eq!(stats.active(), 7);
        assert!(stats.is_healthy());

        let empty_stats = PoolStats { size: 0, idle: 0 };
        assert_eq!(empty_stats.active(), 0);
        assert!(!empty_stats.is_healthy());
    }

    #[tokio::test]
    async fn test_create_in_memory_pool_uses_single_connection() {
        let pool = create_pool(&memory_config()).await.unwrap();
        assert!(get_pool_stats(&pool).is_healthy());
        assert!(pool.size() <= 1);
    }

    #[tokio::test]
    async fn test_create_file_pool_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("passkeeper.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
            max_connections: 2,
            min_connections: 0,
            auto_migrate: true,
            ..Default::default()
        };

        let pool = create_pool(&config).await.unwrap();
        crate::storage::check_connection(&pool).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_create_pool_invalid_config() {
        let config = DatabaseConfig { max_connections: 0, ..memory_config() };
        assert!(create_pool(&config).await.is_err());
    }
}
