//! Account repository used by registration and login

use crate::auth::account::Account;
use crate::domain::AccountId;
use crate::errors::{PassKeeperError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use sqlx::FromRow;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct AccountRow {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Create an account; a taken login is a `Conflict`
    async fn create_account(&self, login: &str, password_hash: &str) -> Result<Account>;

    /// Look up an account together with its password hash
    async fn find_account_by_login(&self, login: &str) -> Result<Option<Account>>;
}

#[derive(Debug, Clone)]
pub struct SqlxAccountRepository {
    pool: DbPool,
}

impl SqlxAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: AccountRow) -> Account {
        Account { id: AccountId::new(row.id), login: row.login, password_hash: row.password_hash }
    }
}

/// SQLite reports UNIQUE violations with extended code 2067
fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error().is_some_and(|db_err| {
        db_err.is_unique_violation() || db_err.code().is_some_and(|code| code.as_ref() == "2067")
    })
}

#[async_trait]
impl AccountRepository for SqlxAccountRepository {
    #[instrument(skip(self, password_hash), fields(login = %login), name = "db_create_account")]
    async fn create_account(&self, login: &str, password_hash: &str) -> Result<Account> {
        let result = sqlx::query("INSERT INTO accounts (login, password_hash) VALUES ($1, $2)")
            .bind(login)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    tracing::warn!(login = %login, "Login already registered");
                    return PassKeeperError::conflict(
                        format!("Login '{}' is already taken", login),
                        "account",
                    );
                }
                PassKeeperError::database(err, "Failed to create account")
            })?;

        Ok(Account {
            id: AccountId::new(result.last_insert_rowid()),
            login: login.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    #[instrument(skip(self), fields(login = %login), name = "db_find_account_by_login")]
    async fn find_account_by_login(&self, login: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, login, password_hash FROM accounts WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| PassKeeperError::database(err, "Failed to fetch account by login"))?;

        Ok(row.map(Self::row_to_account))
    }
}
