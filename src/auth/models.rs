//! Request-scoped identity and authentication errors.

use thiserror::Error;

use crate::auth::jwt::TokenError;
use crate::domain::AccountId;
use crate::errors::{AuthErrorType, Error};

/// The authenticated identity attached to a request after token validation.
///
/// Built only by the authentication middleware and passed explicitly to every
/// operation that needs to know who is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Principal {
    owner_id: AccountId,
}

impl Principal {
    pub fn new(owner_id: AccountId) -> Self {
        Self { owner_id }
    }

    pub fn owner_id(&self) -> AccountId {
        self.owner_id
    }
}

/// Errors returned by authentication middleware/services.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("unauthorized: token missing")]
    MissingToken,
    #[error("unauthorized: malformed token")]
    MalformedToken,
    #[error("unauthorized: token is invalid or expired")]
    InvalidOrExpiredToken,
    #[error("invalid login or password")]
    InvalidCredentials,
    #[error("forbidden: secret belongs to another account")]
    Forbidden,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidOrExpiredToken => AuthError::InvalidOrExpiredToken,
            TokenError::MalformedToken | TokenError::Signing(_) => AuthError::MalformedToken,
        }
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::MissingToken => Error::auth(message, AuthErrorType::MissingToken),
            AuthError::MalformedToken => Error::auth(message, AuthErrorType::InvalidToken),
            AuthError::InvalidOrExpiredToken => Error::auth(message, AuthErrorType::ExpiredToken),
            AuthError::InvalidCredentials => {
                Error::auth(message, AuthErrorType::InvalidCredentials)
            }
            AuthError::Forbidden => Error::forbidden(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_exposes_owner() {
        let principal = Principal::new(AccountId::new(5));
        assert_eq!(principal.owner_id(), AccountId::new(5));
    }

    #[test]
    fn token_errors_map_to_auth_errors() {
        assert_eq!(AuthError::from(TokenError::MalformedToken), AuthError::MalformedToken);
        assert_eq!(
            AuthError::from(TokenError::InvalidOrExpiredToken),
            AuthError::InvalidOrExpiredToken
        );
    }

    #[test]
    fn auth_errors_convert_to_status_codes() {
        assert_eq!(Error::from(AuthError::InvalidCredentials).status_code(), 401);
        assert_eq!(Error::from(AuthError::MalformedToken).status_code(), 401);
        assert_eq!(Error::from(AuthError::InvalidOrExpiredToken).status_code(), 401);
        assert_eq!(Error::from(AuthError::Forbidden).status_code(), 403);
    }
}
