//! Encoding of secret payloads to and from the opaque `value` column.
//!
//! Structured variants are stored as JSON objects with capitalised field
//! names. Binary payloads are stored as the base64 text the client supplied:
//! the write path never re-encodes it and the read path decodes it exactly once.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{CreditCard, KeyValue, SecretType, SecretVariant, Text};
use crate::secrets::SecretError;

/// Encode a variant into the bytes persisted for it.
pub fn encode(variant: &SecretVariant) -> Result<Vec<u8>, SecretError> {
    match variant {
        SecretVariant::KeyValue(kv) => to_json(SecretType::KeyValue, kv),
        SecretVariant::Text(text) => to_json(SecretType::Text, text),
        SecretVariant::CreditCard(card) => to_json(SecretType::CreditCard, card),
        SecretVariant::ByteSlice(base64_text) => Ok(base64_text.clone()),
    }
}

/// Decode stored bytes using a raw type tag.
///
/// Fails with [`SecretError::UnsupportedType`] when the tag is unknown.
pub fn decode(tag: &str, bytes: &[u8]) -> Result<SecretVariant, SecretError> {
    let secret_type =
        tag.parse::<SecretType>().map_err(|err| SecretError::UnsupportedType(err.0))?;
    decode_typed(secret_type, bytes)
}

/// Decode stored bytes for an already-resolved type.
pub fn decode_typed(secret_type: SecretType, bytes: &[u8]) -> Result<SecretVariant, SecretError> {
    match secret_type {
        SecretType::KeyValue => {
            from_json::<KeyValue>(secret_type, bytes).map(SecretVariant::KeyValue)
        }
        SecretType::Text => from_json::<Text>(secret_type, bytes).map(SecretVariant::Text),
        SecretType::CreditCard => {
            from_json::<CreditCard>(secret_type, bytes).map(SecretVariant::CreditCard)
        }
        SecretType::ByteSlice => STANDARD
            .decode(bytes)
            .map(SecretVariant::ByteSlice)
            .map_err(|err| SecretError::malformed_payload(secret_type, err.to_string())),
    }
}

fn to_json<T: Serialize>(secret_type: SecretType, value: &T) -> Result<Vec<u8>, SecretError> {
    serde_json::to_vec(value).map_err(|err| SecretError::encoding(secret_type, err.to_string()))
}

fn from_json<T: DeserializeOwned>(secret_type: SecretType, bytes: &[u8]) -> Result<T, SecretError> {
    serde_json::from_slice(bytes)
        .map_err(|err| SecretError::malformed_payload(secret_type, err.to_string()))
}
