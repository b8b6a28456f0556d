//! Secret endpoints. Every handler receives the caller's [`Principal`] from the
//! authentication middleware and passes it to the service.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use tracing::instrument;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::models::Principal;
use crate::domain::{Secret, SecretId, SecretRequest};

/// `POST /api/secret`: create (id 0) or overwrite a secret.
#[instrument(skip(state, body), fields(owner_id = %principal.owner_id()), name = "write_secret_handler")]
pub async fn write_secret_handler(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<SecretRequest>, JsonRejection>,
) -> Result<Json<Secret>, ApiError> {
    let Json(request) = body?;
    let saved = state.secrets.write(&principal, &request).await?;
    Ok(Json(saved))
}

/// `GET /api/secret/{id}`
#[instrument(skip(state, id), fields(owner_id = %principal.owner_id()), name = "get_secret_handler")]
pub async fn get_secret_handler(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<SecretId>, PathRejection>,
) -> Result<Json<Secret>, ApiError> {
    let Path(id) = id?;
    let secret = state.secrets.read(&principal, id).await?;
    Ok(Json(secret))
}

/// `DELETE /api/secret/{id}`: responds with a JSON `null` body.
#[instrument(skip(state, id), fields(owner_id = %principal.owner_id()), name = "delete_secret_handler")]
pub async fn delete_secret_handler(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<SecretId>, PathRejection>,
) -> Result<Json<Option<Secret>>, ApiError> {
    let Path(id) = id?;
    state.secrets.delete(&principal, id).await?;
    Ok(Json(None))
}

/// `GET /api/secrets`: the caller's secrets ordered by id.
#[instrument(skip(state), fields(owner_id = %principal.owner_id()), name = "list_secrets_handler")]
pub async fn list_secrets_handler(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Secret>>, ApiError> {
    let secrets = state.secrets.list(&principal).await?;
    Ok(Json(secrets))
}
