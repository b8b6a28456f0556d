//! # Error Handling
//!
//! Error types shared by the PassKeeper core, storage layer and HTTP glue.

pub mod types;

pub use types::{AuthErrorType, PassKeeperError, Result};

/// Short alias used throughout the crate
pub type Error = PassKeeperError;
