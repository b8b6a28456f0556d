//! Business logic services
//!
//! Service layer components that encapsulate business logic, separated from
//! HTTP concerns.

pub mod secret_service;

pub use secret_service::SecretService;
