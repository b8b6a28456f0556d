//! # Structured Logging
//!
//! Subscriber setup plus span macros for request and database tracking.

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{PassKeeperError, Result};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Create a tracing span for request tracking.
///
/// ```rust,ignore
/// let span = request_span!("GET", "/api/secrets", secret_id = 7);
/// ```
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            owner_id = tracing::field::Empty
        )
    };
    ($method:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            owner_id = tracing::field::Empty,
            $($field)*
        )
    };
}

/// Create a tracing span for database operations.
#[macro_export]
macro_rules! db_span {
    ($operation:expr) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global fmt subscriber.
///
/// `RUST_LOG` overrides the configured level. Returns `Ok(false)` when a
/// subscriber was already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|err| {
            PassKeeperError::config(format!("Invalid log level '{}': {}", config.log_level, err))
        })?,
    };

    let installed = if config.json_logging {
        let subscriber = FmtSubscriber::builder().with_env_filter(filter).json().finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    } else {
        let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    };

    Ok(installed)
}

/// Log configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        run_address = %config.server.run_address,
        database_max_connections = config.database.max_connections,
        token_expiry_minutes = config.auth.token_expiry_minutes,
        json_logging = config.observability.json_logging,
        metrics_port = config.observability.metrics_port,
        "PassKeeper configuration"
    );
}
