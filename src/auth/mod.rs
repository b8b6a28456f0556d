//! Authentication and authorization module entry point.
//!
//! Password hashing, token issuance and validation, the request middleware that
//! attaches a [`Principal`], ownership checks, and the account flows built on them.

pub mod account;
pub mod account_service;
pub mod hashing;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod ownership;

pub use account::{Account, Credentials, RegisteredAccount};
pub use account_service::{AccountService, LoginOutcome};
pub use jwt::{Claims, JwtSettings, TokenError, TokenService};
pub use models::{AuthError, Principal};
pub use ownership::{authorize_delete, authorize_read, is_owner, Owned};
