//! # Configuration Management
//!
//! Configuration is read from environment variables (a `.env` file is loaded
//! by the binary first) and from command-line flags. When both name the same
//! setting, a set environment variable wins over the flag.

pub mod settings;

pub use settings::{AppConfig, AuthConfig, DatabaseConfig, ObservabilityConfig, ServerConfig};

use crate::errors::{PassKeeperError, Result};
use clap::Args;
use std::str::FromStr;

pub const ENV_RUN_ADDRESS: &str = "RUN_ADDRESS";
pub const ENV_DATABASE_URI: &str = "DATABASE_URI";
pub const ENV_JWT_PASSWORD: &str = "JWT_PASSWORD";
pub const ENV_EXPIRATION_TIME: &str = "EXPIRATION_TIME";
pub const ENV_SERVER_LOG: &str = "SERVER_LOG";
pub const ENV_LOG_JSON: &str = "PASSKEEPER_LOG_JSON";
pub const ENV_METRICS_PORT: &str = "PASSKEEPER_METRICS_PORT";
pub const ENV_DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";

/// Server command-line flags
#[derive(Debug, Clone, Default, Args)]
pub struct ServerFlags {
    /// Address to listen on, host:port
    #[arg(short = 'a', long = "address")]
    pub run_address: Option<String>,

    /// Database connection URL
    #[arg(short = 'd', long = "database")]
    pub database_uri: Option<String>,

    /// Secret used to sign tokens
    #[arg(short = 'p', long = "jwt-secret")]
    pub jwt_secret: Option<String>,

    /// Token lifetime in minutes
    #[arg(short = 't', long = "token-ttl")]
    pub token_expiry_minutes: Option<i64>,
}

impl AppConfig {
    /// Load configuration from the process environment and flags, then validate it.
    pub fn load(flags: &ServerFlags) -> Result<Self> {
        Self::from_sources(|key| std::env::var(key).ok(), flags)
    }

    /// Load configuration from the process environment alone.
    pub fn from_env() -> Result<Self> {
        Self::load(&ServerFlags::default())
    }

    /// Build configuration from an arbitrary variable lookup and flags.
    pub fn from_sources<F>(lookup: F, flags: &ServerFlags) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let mut config = AppConfig::default();

        if let Some(address) = lookup(ENV_RUN_ADDRESS).or_else(|| flags.run_address.clone()) {
            config.server.run_address = address;
        }

        if let Some(url) = lookup(ENV_DATABASE_URI).or_else(|| flags.database_uri.clone()) {
            config.database.url = url;
        }
        if let Some(max) = parse_var::<u32>(&lookup, ENV_DATABASE_MAX_CONNECTIONS)? {
            config.database.max_connections = max;
        }

        if let Some(secret) = lookup(ENV_JWT_PASSWORD).or_else(|| flags.jwt_secret.clone()) {
            config.auth.jwt_secret = secret;
        }
        match parse_var::<i64>(&lookup, ENV_EXPIRATION_TIME)? {
            Some(minutes) => config.auth.token_expiry_minutes = minutes,
            None => {
                if let Some(minutes) = flags.token_expiry_minutes {
                    config.auth.token_expiry_minutes = minutes;
                }
            }
        }

        if let Some(level) = lookup(ENV_SERVER_LOG) {
            config.observability.log_level = level;
        }
        if let Some(json) = lookup(ENV_LOG_JSON) {
            config.observability.json_logging = parse_bool(&json);
        }
        if let Some(port) = parse_var::<u16>(&lookup, ENV_METRICS_PORT)? {
            config.observability.metrics_port = port;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|err| {
                PassKeeperError::config_with_source(
                    format!("Invalid value for {}: {}", key, err),
                    Box::new(err),
                )
            })
        })
        .transpose()
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
