//! Human-readable rendering of decoded secrets.

use crate::domain::{DecodedSecret, Secret, SecretVariant};
use crate::secrets::dispatch;
use crate::secrets::metadata::FileInfo;

/// Shown for binary secrets whose metadata does not carry a description
pub const BINARY_PLACEHOLDER: &str = "*Binary data*";

/// Shown for anything that cannot be decoded
pub const UNKNOWN_PLACEHOLDER: &str = "Unknown Value Type";

/// Render a decoded secret. Never fails.
pub fn render(secret: &DecodedSecret) -> String {
    match &secret.value {
        SecretVariant::KeyValue(kv) => format!("Key: {},\nValue: {}", kv.key, kv.value),
        SecretVariant::Text(text) => text.value.clone(),
        SecretVariant::CreditCard(card) => format!(
            "Number: {},\n Expiration: {},\n CVV: {},\n Cardholder: {}",
            card.number, card.expiration, card.cvv, card.cardholder
        ),
        SecretVariant::ByteSlice(_) => match FileInfo::parse(&secret.metadata) {
            Some(info) => info.description,
            None => BINARY_PLACEHOLDER.to_string(),
        },
    }
}

/// Decode and render a stored row, falling back to [`UNKNOWN_PLACEHOLDER`].
pub fn render_stored(secret: &Secret) -> String {
    match dispatch::resolve_stored(secret) {
        Ok(decoded) => render(&decoded),
        Err(err) => {
            tracing::debug!(secret_id = %secret.id, error = %err, "secret could not be decoded");
            UNKNOWN_PLACEHOLDER.to_string()
        }
    }
}
