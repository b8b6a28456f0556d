//! HTTP handlers, one module per resource.

pub mod accounts;
pub mod health;
pub mod secrets;

pub use accounts::{login_handler, register_handler};
pub use health::{health_handler, HealthResponse};
pub use secrets::{
    delete_secret_handler, get_secret_handler, list_secrets_handler, write_secret_handler,
};
