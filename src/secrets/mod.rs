//! Secret payload handling.
//!
//! Secrets reach the service as a type tag plus either structured JSON fields
//! or base64 text, and are persisted as an opaque byte column next to the tag.
//!
//! - [`dispatch`] maps a request tag or a stored tag onto a [`SecretVariant`]
//! - [`codec`] turns a variant into stored bytes and back
//! - [`presenter`] renders a decoded secret for display
//! - [`metadata`] handles the `name|extension|description` convention used by
//!   binary secrets
//!
//! [`SecretVariant`]: crate::domain::SecretVariant

pub mod codec;
pub mod dispatch;
pub mod error;
pub mod metadata;
pub mod presenter;

pub use error::SecretError;
pub use metadata::FileInfo;
