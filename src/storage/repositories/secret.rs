//! Secret repository
//!
//! Rows hold the codec output as an opaque BLOB next to its type tag. The
//! repository never interprets the payload.

use crate::domain::{AccountId, NewSecret, Secret, SecretId};
use crate::errors::{PassKeeperError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use sqlx::FromRow;
use tracing::instrument;

/// Database row structure for secrets
#[derive(Debug, Clone, FromRow)]
struct SecretRow {
    pub id: i64,
    pub user_id: i64,
    pub value: Vec<u8>,
    pub secret_type: String,
    pub metadata: String,
}

impl From<SecretRow> for Secret {
    fn from(row: SecretRow) -> Self {
        Secret {
            id: SecretId::new(row.id),
            owner_id: AccountId::new(row.user_id),
            value: row.value,
            secret_type: row.secret_type,
            metadata: row.metadata,
        }
    }
}

#[async_trait]
pub trait SecretRepository: Send + Sync {
    /// Insert when `secret.id` is unassigned, otherwise overwrite that row.
    ///
    /// Overwriting a row owned by another account fails with `Forbidden`.
    async fn save_secret(&self, secret: NewSecret) -> Result<Secret>;

    async fn find_secret_by_id(&self, id: SecretId) -> Result<Option<Secret>>;

    /// Delete the row only when `owner_id` matches. Returns whether a row was removed.
    async fn delete_secret(&self, id: SecretId, owner_id: AccountId) -> Result<bool>;

    /// All rows owned by `owner_id`, ordered by id
    async fn list_secrets_for_owner(&self, owner_id: AccountId) -> Result<Vec<Secret>>;
}

#[derive(Debug, Clone)]
pub struct SqlxSecretRepository {
    pool: DbPool,
}

impl SqlxSecretRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecretRepository for SqlxSecretRepository {
    #[instrument(
        skip(self, secret),
        fields(secret_id = %secret.id, owner_id = %secret.owner_id, secret_type = %secret.secret_type),
        name = "db_save_secret"
    )]
    async fn save_secret(&self, secret: NewSecret) -> Result<Secret> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| PassKeeperError::database(err, "Failed to begin secret transaction"))?;

        let id = if secret.id.is_unassigned() {
            let result = sqlx::query(
                "INSERT INTO secrets (user_id, value, secret_type, metadata) VALUES ($1, $2, $3, $4)",
            )
            .bind(secret.owner_id)
            .bind(&secret.value)
            .bind(secret.secret_type.as_str())
            .bind(&secret.metadata)
            .execute(&mut *tx)
            .await
            .map_err(|err| PassKeeperError::database(err, "Failed to insert secret"))?;

            SecretId::new(result.last_insert_rowid())
        } else {
            let existing_owner: Option<i64> =
                sqlx::query_scalar("SELECT user_id FROM secrets WHERE id = $1")
                    .bind(secret.id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|err| {
                        PassKeeperError::database(err, "Failed to look up secret owner")
                    })?;

            match existing_owner.map(AccountId::new) {
                Some(owner) if owner != secret.owner_id => {
                    tracing::warn!(
                        secret_id = %secret.id,
                        owner_id = %owner,
                        requested_by = %secret.owner_id,
                        "Refusing to overwrite a secret owned by another account"
                    );
                    return Err(PassKeeperError::forbidden("Secret belongs to another account"));
                }
                Some(_) => {
                    let result = sqlx::query(
                        "UPDATE secrets SET value = $1, secret_type = $2, metadata = $3, updated_at = CURRENT_TIMESTAMP WHERE id = $4 AND user_id = $5",
                    )
                    .bind(&secret.value)
                    .bind(secret.secret_type.as_str())
                    .bind(&secret.metadata)
                    .bind(secret.id)
                    .bind(secret.owner_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|err| PassKeeperError::database(err, "Failed to update secret"))?;

                    if result.rows_affected() == 0 {
                        return Err(PassKeeperError::not_found("secret", secret.id.to_string()));
                    }
                }
                None => {
                    sqlx::query(
                        "INSERT INTO secrets (id, user_id, value, secret_type, metadata) VALUES ($1, $2, $3, $4, $5)",
                    )
                    .bind(secret.id)
                    .bind(secret.owner_id)
                    .bind(&secret.value)
                    .bind(secret.secret_type.as_str())
                    .bind(&secret.metadata)
                    .execute(&mut *tx)
                    .await
                    .map_err(|err| PassKeeperError::database(err, "Failed to insert secret"))?;
                }
            }

            secret.id
        };

        tx.commit()
            .await
            .map_err(|err| PassKeeperError::database(err, "Failed to commit secret"))?;

        Ok(Secret {
            id,
            owner_id: secret.owner_id,
            value: secret.value,
            secret_type: secret.secret_type.as_str().to_string(),
            metadata: secret.metadata,
        })
    }

    #[instrument(skip(self), fields(secret_id = %id), name = "db_find_secret_by_id")]
    async fn find_secret_by_id(&self, id: SecretId) -> Result<Option<Secret>> {
        let row = sqlx::query_as::<_, SecretRow>(
            "SELECT id, user_id, value, secret_type, metadata FROM secrets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| PassKeeperError::database(err, "Failed to fetch secret"))?;

        Ok(row.map(Secret::from))
    }

    #[instrument(skip(self), fields(secret_id = %id, owner_id = %owner_id), name = "db_delete_secret")]
    async fn delete_secret(&self, id: SecretId, owner_id: AccountId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM secrets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|err| PassKeeperError::database(err, "Failed to delete secret"))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id), name = "db_list_secrets_for_owner")]
    async fn list_secrets_for_owner(&self, owner_id: AccountId) -> Result<Vec<Secret>> {
        let rows = sqlx::query_as::<_, SecretRow>(
            "SELECT id, user_id, value, secret_type, metadata FROM secrets WHERE user_id = $1 ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| PassKeeperError::database(err, "Failed to list secrets"))?;

        Ok(rows.into_iter().map(Secret::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SecretType;
    use crate::storage::test_pool;

    fn new_text(id: i64, owner: i64, value: &str) -> NewSecret {
        NewSecret {
            id: SecretId::new(id),
            owner_id: AccountId::new(owner),
            value: value.as_bytes().to_vec(),
            secret_type: SecretType::Text,
            metadata: "note".into(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_round_trips() {
        let repo = SqlxSecretRepository::new(test_pool().await);

        let saved = repo.save_secret(new_text(0, 1, r#"{"Value":"hello"}"#)).await.unwrap();
        assert!(!saved.id.is_unassigned());
        assert_eq!(saved.secret_type, "Text");

        let found = repo.find_secret_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(found, saved);
    }

    #[tokio::test]
    async fn overwrite_keeps_owner() {
        let repo = SqlxSecretRepository::new(test_pool().await);
        let saved = repo.save_secret(new_text(0, 1, "first")).await.unwrap();

        let updated = repo.save_secret(new_text(saved.id.get(), 1, "second")).await.unwrap();
        assert_eq!(updated.id, saved.id);

        let found = repo.find_secret_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(found.value, b"second");
        assert_eq!(found.owner_id, AccountId::new(1));
    }

    #[tokio::test]
    async fn overwrite_by_other_owner_is_forbidden() {
        let repo = SqlxSecretRepository::new(test_pool().await);
        let saved = repo.save_secret(new_text(0, 1, "mine")).await.unwrap();

        let err = repo.save_secret(new_text(saved.id.get(), 2, "theirs")).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let found = repo.find_secret_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(found.value, b"mine");
        assert_eq!(found.owner_id, AccountId::new(1));
    }

    #[tokio::test]
    async fn overwrite_that_changes_no_row_is_not_found() {
        let pool = test_pool().await;
        let repo = SqlxSecretRepository::new(pool.clone());
        let saved = repo.save_secret(new_text(0, 1, "first")).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER skip_secret_updates BEFORE UPDATE ON secrets BEGIN SELECT RAISE(IGNORE); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let err = repo.save_secret(new_text(saved.id.get(), 1, "second")).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let found = repo.find_secret_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(found.value, b"first");
    }

    #[tokio::test]
    async fn explicit_unknown_id_inserts_with_that_id() {
        let repo = SqlxSecretRepository::new(test_pool().await);
        let saved = repo.save_secret(new_text(42, 1, "value")).await.unwrap();
        assert_eq!(saved.id, SecretId::new(42));
        assert!(repo.find_secret_by_id(SecretId::new(42)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_requires_matching_owner() {
        let repo = SqlxSecretRepository::new(test_pool().await);
        let saved = repo.save_secret(new_text(0, 1, "value")).await.unwrap();

        assert!(!repo.delete_secret(saved.id, AccountId::new(2)).await.unwrap());
        assert!(repo.find_secret_by_id(saved.id).await.unwrap().is_some());

        assert!(repo.delete_secret(saved.id, AccountId::new(1)).await.unwrap());
        assert!(repo.find_secret_by_id(saved.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_returns_only_owned_rows_in_id_order() {
        let repo = SqlxSecretRepository::new(test_pool().await);
        let first = repo.save_secret(new_text(0, 1, "a")).await.unwrap();
        repo.save_secret(new_text(0, 2, "b")).await.unwrap();
        let third = repo.save_secret(new_text(0, 1, "c")).await.unwrap();

        let listed = repo.list_secrets_for_owner(AccountId::new(1)).await.unwrap();
        let ids: Vec<SecretId> = listed.iter().map(|secret| secret.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);

        assert!(repo.list_secrets_for_owner(AccountId::new(3)).await.unwrap().is_empty());
    }
}
