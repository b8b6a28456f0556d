//! JWT issuance and validation for PassKeeper identities.
//!
//! Tokens are HS256-signed and carry only the owner id and an expiry. The
//! signing settings are built once at startup and shared read-only.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::AccountId;

/// Immutable signing configuration
#[derive(Clone)]
pub struct JwtSettings {
    signing_secret: Vec<u8>,
    expiration_minutes: i64,
}

impl JwtSettings {
    pub fn new(signing_secret: impl Into<Vec<u8>>, expiration_minutes: i64) -> Self {
        Self { signing_secret: signing_secret.into(), expiration_minutes }
    }

    pub fn signing_secret(&self) -> &[u8] {
        &self.signing_secret
    }

    pub fn expiration_minutes(&self) -> i64 {
        self.expiration_minutes
    }
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("signing_secret", &"<redacted>")
            .field("expiration_minutes", &self.expiration_minutes)
            .finish()
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "UserID")]
    pub user_id: AccountId,
    pub exp: i64,
}

/// Token failures
#[derive(Debug, Error)]
pub enum TokenError {
    /// The text is not a token, or its signature does not verify.
    #[error("malformed token")]
    MalformedToken,
    /// The token verified but its validity window has passed.
    #[error("token is invalid or expired")]
    InvalidOrExpiredToken,
    /// The signing library failed; indicates misconfiguration.
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Issues and validates identity tokens
#[derive(Clone)]
pub struct TokenService {
    settings: Arc<JwtSettings>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(settings: Arc<JwtSettings>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(settings.signing_secret()),
            decoding_key: DecodingKey::from_secret(settings.signing_secret()),
            settings,
            validation,
        }
    }

    pub fn settings(&self) -> &JwtSettings {
        &self.settings
    }

    /// Issue a token for the owner, valid for the configured lifetime from now.
    pub fn issue(&self, user_id: AccountId) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if it were issued at `issued_at`.
    pub fn issue_at(
        &self,
        user_id: AccountId,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at + Duration::minutes(self.settings.expiration_minutes());
        let claims = Claims { user_id, exp: expires_at.timestamp() };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify a token and return the owner id it carries.
    pub fn validate(&self, token: &str) -> Result<AccountId, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.user_id)
            .map_err(|err| classify(err.kind()))
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService").field("settings", &self.settings).finish_non_exhaustive()
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject => TokenError::InvalidOrExpiredToken,
        _ => TokenError::MalformedToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str, minutes: i64) -> TokenService {
        TokenService::new(Arc::new(JwtSettings::new(secret, minutes)))
    }

    #[test]
    fn validate_returns_issued_owner() {
        let tokens = service("test-secret", 15);
        let token = tokens.issue(AccountId::new(42)).unwrap();
        assert!(!token.is_empty());
        assert_eq!(tokens.validate(&token).unwrap(), AccountId::new(42));
    }

    #[test]
    fn expired_token_is_invalid_or_expired() {
        let tokens = service("test-secret", 15);
        let token =
            tokens.issue_at(AccountId::new(1), Utc::now() - Duration::minutes(20)).unwrap();
        assert!(matches!(tokens.validate(&token), Err(TokenError::InvalidOrExpiredToken)));
    }

    #[test]
    fn foreign_signature_is_malformed() {
        let token = service("other-secret", 15).issue(AccountId::new(1)).unwrap();
        let err = service("test-secret", 15).validate(&token).unwrap_err();
        assert!(matches!(err, TokenError::MalformedToken));
    }

    #[test]
    fn garbage_is_malformed() {
        let tokens = service("test-secret", 15);
        for input in ["", "not-a-token", "a.b.c"] {
            assert!(matches!(tokens.validate(input), Err(TokenError::MalformedToken)));
        }
    }

    #[test]
    fn token_without_expiry_is_rejected() {
        #[derive(Serialize)]
        struct NoExpiry {
            #[serde(rename = "UserID")]
            user_id: i64,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoExpiry { user_id: 7 },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let err = service("test-secret", 15).validate(&token).unwrap_err();
        assert!(matches!(err, TokenError::InvalidOrExpiredToken));
    }

    #[test]
    fn claims_carry_owner_and_expiry() {
        let tokens = service("test-secret", 30);
        let issued_at = Utc::now();
        let token = tokens.issue_at(AccountId::new(9), issued_at).unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.user_id, AccountId::new(9));
        assert_eq!(data.claims.exp, (issued_at + Duration::minutes(30)).timestamp());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", JwtSettings::new("super-secret", 15));
        assert!(!rendered.contains("super-secret"));
    }
}
