//! Registration and login.

use std::sync::{Arc, LazyLock};

use tracing::{info, instrument, warn};

use crate::auth::account::{Credentials, RegisteredAccount};
use crate::auth::hashing;
use crate::auth::jwt::TokenService;
use crate::auth::models::AuthError;
use crate::errors::{Error, Result};
use crate::observability::metrics;
use crate::storage::repositories::{AccountRepository, SqlxAccountRepository};
use crate::storage::DbPool;

/// Verified against for unknown logins so both failure paths cost one Argon2 run.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hashing::hash_password("dummy_startup_value")
        .unwrap_or_else(|_| "$argon2id$v=19$m=768,t=1,p=1$dW5rbm93bg$dW5rbm93bg".to_string())
});

/// Token issued on a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: String,
}

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    tokens: Arc<TokenService>,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountRepository>, tokens: Arc<TokenService>) -> Self {
        Self { accounts, tokens }
    }

    pub fn with_sqlx(pool: DbPool, tokens: Arc<TokenService>) -> Self {
        Self::new(Arc::new(SqlxAccountRepository::new(pool)), tokens)
    }

    /// Create an account and issue its first token.
    ///
    /// # Errors
    ///
    /// - `Validation` when the login or password is too short
    /// - `Conflict` when the login is taken
    #[instrument(skip(self, credentials), fields(login = %credentials.login))]
    pub async fn register(&self, credentials: &Credentials) -> Result<RegisteredAccount> {
        if let Err(err) = credentials.validate_registration() {
            metrics::record_auth_attempt("register_invalid");
            return Err(err);
        }

        let password_hash = hashing::hash_password_blocking(credentials.password.clone()).await?;

        let account = match self.accounts.create_account(&credentials.login, &password_hash).await
        {
            Ok(account) => account,
            Err(err) => {
                if matches!(err, Error::Conflict { .. }) {
                    metrics::record_auth_attempt("register_conflict");
                }
                return Err(err);
            }
        };

        let token = self.tokens.issue(account.id)?;

        metrics::record_auth_attempt("register_success");
        info!(account_id = %account.id, login = %account.login, "account registered");

        Ok(RegisteredAccount { id: account.id, login: account.login, token })
    }

    /// Check a login and password and issue a fresh token.
    ///
    /// Unknown login and wrong password fail identically.
    #[instrument(skip(self, credentials), fields(login = %credentials.login))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        credentials.validate_login()?;

        let account = match self.accounts.find_account_by_login(&credentials.login).await? {
            Some(account) => account,
            None => {
                hashing::verify_password_blocking(
                    credentials.password.clone(),
                    DUMMY_HASH.clone(),
                )
                .await?;
                warn!(login = %credentials.login, "login attempt for unknown account");
                metrics::record_auth_attempt("invalid_credentials");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let matches = hashing::verify_password_blocking(
            credentials.password.clone(),
            account.password_hash.clone(),
        )
        .await?;
        if !matches {
            warn!(account_id = %account.id, "login attempt with incorrect password");
            metrics::record_auth_attempt("invalid_credentials");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(account.id)?;

        metrics::record_auth_attempt("login_success");
        info!(account_id = %account.id, "account logged in");

        Ok(LoginOutcome { token })
    }
}
