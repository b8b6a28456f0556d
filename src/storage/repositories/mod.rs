//! Repository modules for data access
//!
//! Each repository is an async trait with an SQLx-backed implementation.

pub mod account;
pub mod secret;

pub use account::{AccountRepository, SqlxAccountRepository};
pub use secret::{SecretRepository, SqlxSecretRepository};
