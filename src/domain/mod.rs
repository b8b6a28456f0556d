//! Domain layer
//!
//! Pure domain entities with no HTTP or database concerns beyond the SQLx
//! encode/decode impls on identifiers.
//!
//! ## Module Organization
//!
//! - `id`: Type-safe identifiers with NewType pattern
//! - `secret`: Secret rows, payload shapes and the write request

pub mod id;
pub mod secret;

pub use id::{AccountId, SecretId};
pub use secret::{
    CreditCard, DecodedSecret, KeyValue, NewSecret, Secret, SecretRequest, SecretType,
    SecretVariant, Text, UnknownSecretType,
};
