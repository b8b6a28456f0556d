//! Error types for secret payload dispatch and encoding.

use thiserror::Error;

use crate::domain::SecretType;

/// Errors raised while mapping secret payloads to and from their stored form.
///
/// Messages deliberately name only the secret type, never the parser output,
/// so they are safe to surface to clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretError {
    /// The request named a type tag outside the known set.
    #[error("invalid secret type: {0}")]
    InvalidType(String),

    /// The structured payload of a known non-binary request could not be parsed.
    #[error("malformed {0} secret request")]
    MalformedRequest(SecretType),

    /// The codec was asked to handle a tag it does not know.
    #[error("unsupported secret type: {0}")]
    UnsupportedType(String),

    /// A stored row carries a tag outside the known set.
    #[error("stored secret has unknown type: {0}")]
    UnknownStoredType(String),

    /// Stored bytes do not parse into the shape named by their tag.
    #[error("malformed {secret_type} payload")]
    MalformedPayload { secret_type: SecretType, reason: String },

    /// A payload could not be serialized.
    #[error("failed to encode {secret_type} payload")]
    Encoding { secret_type: SecretType, reason: String },
}

impl SecretError {
    pub fn malformed_payload(secret_type: SecretType, reason: impl Into<String>) -> Self {
        Self::MalformedPayload { secret_type, reason: reason.into() }
    }

    pub fn encoding(secret_type: SecretType, reason: impl Into<String>) -> Self {
        Self::Encoding { secret_type, reason: reason.into() }
    }

    /// Whether the failure was caused by the caller's input rather than stored data.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidType(_) | Self::MalformedRequest(_))
    }
}
