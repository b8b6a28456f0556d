//! # PassKeeper
//!
//! A personal secret-storage service. Users register with a login and
//! password, receive a signed session token, and store typed secrets
//! (text, key/value pairs, credit cards and files) that only they can read
//! or delete.
//!
//! ## Architecture
//!
//! ```text
//! HTTP API (axum) → Auth middleware → Secret / Account services → SQLite (sqlx)
//!        ↓                                    ↓
//!  Request tracing                  Typed payload codec
//! ```
//!
//! ## Core Components
//!
//! - **API**: routes, handlers and the HTTP error mapping
//! - **Auth**: Argon2 password hashing, JWT issuance and ownership rules
//! - **Secrets**: payload dispatch by type name and the at-rest codec
//! - **Storage**: connection pool, migrations and repositories
//! - **Client / CLI**: a reqwest client and the `passkeeper-cli` binary

pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod secrets;
pub mod services;
pub mod storage;

pub use config::AppConfig;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
