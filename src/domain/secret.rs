//! Secret domain types
//!
//! A secret is a user-owned payload stored as an opaque byte column together
//! with a type tag naming the shape of the payload.
//!
//! ## Secret Types
//!
//! - **KeyValue**: a single key and value pair
//! - **Text**: free text
//! - **CreditCard**: number, expiration, CVV and cardholder
//! - **ByteSlice**: arbitrary binary data, carried as base64 text

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::id::{AccountId, SecretId};

/// Closed set of secret payload shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecretType {
    KeyValue,
    Text,
    CreditCard,
    ByteSlice,
}

impl SecretType {
    pub const ALL: [SecretType; 4] =
        [SecretType::KeyValue, SecretType::Text, SecretType::CreditCard, SecretType::ByteSlice];

    /// Tag used on the wire and in the `secret_type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeyValue => "KeyValue",
            Self::Text => "Text",
            Self::CreditCard => "CreditCard",
            Self::ByteSlice => "ByteSlice",
        }
    }
}

/// Error returned when a type tag names none of the known shapes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown secret type: {0}")]
pub struct UnknownSecretType(pub String);

impl FromStr for SecretType {
    type Err = UnknownSecretType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KeyValue" => Ok(Self::KeyValue),
            "Text" => Ok(Self::Text),
            "CreditCard" => Ok(Self::CreditCard),
            "ByteSlice" => Ok(Self::ByteSlice),
            other => Err(UnknownSecretType(other.to_string())),
        }
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value pair secret.
///
/// Field names are written capitalised; lower-case names are accepted on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(rename = "Key", alias = "key")]
    pub key: String,
    #[serde(rename = "Value", alias = "value")]
    pub value: String,
}

/// Free text secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    #[serde(rename = "Value", alias = "value")]
    pub value: String,
}

/// Credit card record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    #[serde(rename = "Number", alias = "number")]
    pub number: String,
    #[serde(rename = "Expiration", alias = "expiration")]
    pub expiration: String,
    #[serde(rename = "CVV", alias = "cvv", alias = "Cvv")]
    pub cvv: String,
    #[serde(rename = "Cardholder", alias = "cardholder")]
    pub cardholder: String,
}

/// In-memory value of a secret payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretVariant {
    KeyValue(KeyValue),
    Text(Text),
    CreditCard(CreditCard),
    /// On the write path this holds the base64 text exactly as the client sent
    /// it. After a stored row is decoded it holds the raw bytes.
    ByteSlice(Vec<u8>),
}

impl SecretVariant {
    pub fn secret_type(&self) -> SecretType {
        match self {
            Self::KeyValue(_) => SecretType::KeyValue,
            Self::Text(_) => SecretType::Text,
            Self::CreditCard(_) => SecretType::CreditCard,
            Self::ByteSlice(_) => SecretType::ByteSlice,
        }
    }

    /// Build the write-path value for raw bytes by base64-encoding them.
    pub fn binary_from_raw(raw: &[u8]) -> Self {
        Self::ByteSlice(STANDARD.encode(raw).into_bytes())
    }
}

impl From<KeyValue> for SecretVariant {
    fn from(value: KeyValue) -> Self {
        Self::KeyValue(value)
    }
}

impl From<Text> for SecretVariant {
    fn from(value: Text) -> Self {
        Self::Text(value)
    }
}

impl From<CreditCard> for SecretVariant {
    fn from(value: CreditCard) -> Self {
        Self::CreditCard(value)
    }
}

/// Stored secret row as returned to clients.
///
/// `secret_type` is kept as the raw tag read from storage so that a row with an
/// unexpected tag can still be reported instead of failing to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(rename = "ID")]
    pub id: SecretId,
    #[serde(rename = "UserID")]
    pub owner_id: AccountId,
    #[serde(rename = "Value", with = "base64_bytes")]
    pub value: Vec<u8>,
    #[serde(rename = "SecretType")]
    pub secret_type: String,
    #[serde(rename = "Metadata", default)]
    pub metadata: String,
}

/// Row to insert or overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSecret {
    /// Unassigned (zero) inserts a new row; anything else overwrites that row.
    pub id: SecretId,
    pub owner_id: AccountId,
    pub value: Vec<u8>,
    pub secret_type: SecretType,
    pub metadata: String,
}

/// Ephemeral projection of a stored secret with its payload decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSecret {
    pub id: SecretId,
    pub owner_id: AccountId,
    pub value: SecretVariant,
    pub metadata: String,
}

/// Inbound secret write request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretRequest {
    /// Zero creates a new secret; any other value overwrites that secret.
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "type", default)]
    pub secret_type: String,
    /// Structured payload for every non-binary type
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
    /// Base64 payload for `ByteSlice`
    #[serde(rename = "byteData", default, skip_serializing_if = "Option::is_none")]
    pub byte_data: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub meta: String,
}

/// Serialize byte columns as standard base64 text.
pub mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}
