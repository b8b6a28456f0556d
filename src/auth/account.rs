//! Account domain models and request/response DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::AccountId;
use crate::errors::{PassKeeperError, Result};

/// Stored representation of an account.
#[derive(Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub login: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Login and password pair accepted by register and login.
///
/// Missing fields deserialize as empty strings so they fail validation with a
/// 400 instead of a body rejection.
#[derive(Clone, Default, Deserialize, Serialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[validate(length(min = 3, message = "Login is not valid"))]
    pub login: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password is not valid"))]
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self { login: login.into(), password: password.into() }
    }

    /// Registration rules: minimum login and password lengths.
    pub fn validate_registration(&self) -> Result<()> {
        self.validate().map_err(PassKeeperError::from)
    }

    /// Login only requires both fields to be present.
    pub fn validate_login(&self) -> Result<()> {
        if self.login.is_empty() || self.password.is_empty() {
            return Err(PassKeeperError::validation("Invalid request"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body returned by a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredAccount {
    pub id: AccountId,
    pub login: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_enforces_minimum_lengths() {
        assert!(Credentials::new("alice", "s3cret!").validate_registration().is_ok());

        let err = Credentials::new("al", "s3cret!").validate_registration().unwrap_err();
        assert!(err.to_string().contains("Login is not valid"));

        let err = Credentials::new("alice", "12345").validate_registration().unwrap_err();
        assert!(err.to_string().contains("Password is not valid"));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn login_requires_both_fields() {
        assert!(Credentials::new("al", "x").validate_login().is_ok());
        assert!(Credentials::new("", "x").validate_login().is_err());
        assert!(Credentials::new("alice", "").validate_login().is_err());
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let credentials: Credentials = serde_json::from_str(r#"{"login":"alice"}"#).unwrap();
        assert_eq!(credentials.password, "");
    }

    #[test]
    fn account_never_serializes_password_hash() {
        let account = Account {
            id: AccountId::new(1),
            login: "alice".into(),
            password_hash: "$argon2id$...".into(),
        };
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "login": "alice"}));
        assert!(!format!("{:?}", account).contains("argon2"));
    }
}
