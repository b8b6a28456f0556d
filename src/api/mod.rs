//! # REST API Components
//!
//! Axum routing, handlers and error mapping for the PassKeeper HTTP surface.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, ApiState};
pub use server::{serve, start_api_server};
