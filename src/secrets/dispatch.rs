//! Type-tag dispatch between wire requests, stored rows and payload variants.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{
    CreditCard, DecodedSecret, KeyValue, Secret, SecretRequest, SecretType, SecretVariant, Text,
};
use crate::secrets::{codec, SecretError};

/// Resolve an inbound request into the variant to persist.
///
/// `ByteSlice` takes the base64 text verbatim (a missing field is an empty
/// payload). Every other tag parses `data` into its structured shape.
pub fn resolve(
    request_type: &str,
    data: &Value,
    byte_data: Option<&str>,
) -> Result<SecretVariant, SecretError> {
    let secret_type =
        request_type.parse::<SecretType>().map_err(|err| SecretError::InvalidType(err.0))?;

    match secret_type {
        SecretType::ByteSlice => {
            Ok(SecretVariant::ByteSlice(byte_data.unwrap_or_default().as_bytes().to_vec()))
        }
        SecretType::KeyValue => parse_fields::<KeyValue>(secret_type, data).map(Into::into),
        SecretType::Text => parse_fields::<Text>(secret_type, data).map(Into::into),
        SecretType::CreditCard => parse_fields::<CreditCard>(secret_type, data).map(Into::into),
    }
}

/// Resolve a full [`SecretRequest`].
pub fn resolve_request(request: &SecretRequest) -> Result<SecretVariant, SecretError> {
    resolve(&request.secret_type, &request.data, request.byte_data.as_deref())
}

/// Decode a stored row, driven by the row's own tag.
pub fn resolve_stored(secret: &Secret) -> Result<DecodedSecret, SecretError> {
    let secret_type = secret
        .secret_type
        .parse::<SecretType>()
        .map_err(|err| SecretError::UnknownStoredType(err.0))?;
    let value = codec::decode_typed(secret_type, &secret.value)?;

    Ok(DecodedSecret {
        id: secret.id,
        owner_id: secret.owner_id,
        value,
        metadata: secret.metadata.clone(),
    })
}

/// Decode a batch of stored rows, failing on the first bad one.
pub fn decode_secrets(secrets: &[Secret]) -> Result<Vec<DecodedSecret>, SecretError> {
    secrets.iter().map(resolve_stored).collect()
}

fn parse_fields<T: DeserializeOwned>(
    secret_type: SecretType,
    data: &Value,
) -> Result<T, SecretError> {
    if data.is_null() {
        return Err(SecretError::MalformedRequest(secret_type));
    }
    T::deserialize(data).map_err(|_| SecretError::MalformedRequest(secret_type))
}
