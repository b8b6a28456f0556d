//! Secret business logic service
//!
//! Wires request dispatch, the payload codec, ownership checks and the
//! repository together. Every operation takes the caller's [`Principal`]
//! explicitly.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::auth::models::{AuthError, Principal};
use crate::auth::ownership;
use crate::domain::{DecodedSecret, NewSecret, Secret, SecretId, SecretRequest};
use crate::errors::{Error, Result};
use crate::observability::metrics;
use crate::secrets::{codec, dispatch};
use crate::storage::repositories::{SecretRepository, SqlxSecretRepository};
use crate::storage::DbPool;

/// Service for managing secret business logic
#[derive(Clone)]
pub struct SecretService {
    repository: Arc<dyn SecretRepository>,
}

impl SecretService {
    pub fn new(repository: Arc<dyn SecretRepository>) -> Self {
        Self { repository }
    }

    pub fn with_sqlx(pool: DbPool) -> Self {
        Self::new(Arc::new(SqlxSecretRepository::new(pool)))
    }

    /// Create or overwrite a secret owned by the caller.
    ///
    /// An id of zero creates a new row. A non-zero id overwrites that row if
    /// the caller owns it.
    #[instrument(
        skip(self, request),
        fields(owner_id = %principal.owner_id(), secret_id = request.id, secret_type = %request.secret_type)
    )]
    pub async fn write(&self, principal: &Principal, request: &SecretRequest) -> Result<Secret> {
        if request.id < 0 {
            return Err(Error::validation_field("Secret id must not be negative", "id"));
        }

        let result = self.store(principal, request).await;
        metrics::record_secret_operation("write", outcome(&result));

        let saved = result?;
        info!(secret_id = %saved.id, secret_type = %saved.secret_type, "secret saved");
        Ok(saved)
    }

    async fn store(&self, principal: &Principal, request: &SecretRequest) -> Result<Secret> {
        let variant = dispatch::resolve_request(request)?;
        let value = codec::encode(&variant)?;

        self.repository
            .save_secret(NewSecret {
                id: SecretId::new(request.id),
                owner_id: principal.owner_id(),
                value,
                secret_type: variant.secret_type(),
                metadata: request.meta.clone(),
            })
            .await
    }

    /// Fetch a secret the caller owns.
    ///
    /// Unknown ids are `NotFound`; another account's secret is `Forbidden`.
    #[instrument(skip(self), fields(owner_id = %principal.owner_id(), secret_id = %id))]
    pub async fn read(&self, principal: &Principal, id: SecretId) -> Result<Secret> {
        let result = self.find_owned(principal, id, ownership::authorize_read).await;
        metrics::record_secret_operation("read", outcome(&result));
        result
    }

    /// Delete a secret the caller owns.
    #[instrument(skip(self), fields(owner_id = %principal.owner_id(), secret_id = %id))]
    pub async fn delete(&self, principal: &Principal, id: SecretId) -> Result<()> {
        let result = self.remove(principal, id).await;
        metrics::record_secret_operation("delete", outcome(&result));

        result?;
        info!("secret deleted");
        Ok(())
    }

    async fn remove(&self, principal: &Principal, id: SecretId) -> Result<()> {
        self.find_owned(principal, id, ownership::authorize_delete).await?;

        if !self.repository.delete_secret(id, principal.owner_id()).await? {
            return Err(Error::not_found("secret", id.to_string()));
        }
        Ok(())
    }

    async fn find_owned(
        &self,
        principal: &Principal,
        id: SecretId,
        authorize: fn(&Secret, &Principal) -> std::result::Result<(), AuthError>,
    ) -> Result<Secret> {
        let secret = self
            .repository
            .find_secret_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("secret", id.to_string()))?;

        authorize(&secret, principal)?;
        Ok(secret)
    }

    /// All secrets owned by the caller, ordered by id.
    #[instrument(skip(self), fields(owner_id = %principal.owner_id()))]
    pub async fn list(&self, principal: &Principal) -> Result<Vec<Secret>> {
        let result = self.repository.list_secrets_for_owner(principal.owner_id()).await;
        metrics::record_secret_operation("list", outcome(&result));
        result
    }

    /// Decode stored rows for presentation. A row with an unknown tag or a
    /// payload that does not match its tag fails the whole batch.
    pub fn decode_all(&self, secrets: &[Secret]) -> Result<Vec<DecodedSecret>> {
        Ok(dispatch::decode_secrets(secrets)?)
    }
}

fn outcome<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(Error::Forbidden { .. }) => "forbidden",
        Err(Error::NotFound { .. }) => "not_found",
        Err(err) if err.status_code() == 400 => "invalid",
        Err(_) => "error",
    }
}
