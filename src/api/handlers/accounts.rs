//! Registration and login endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::instrument;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::account::Credentials;

/// `POST /api/account/register`
///
/// Responds with the created account (without its password) and puts the
/// issued token in the `Authorization` header.
#[instrument(skip(state, body), name = "register_handler")]
pub async fn register_handler(
    State(state): State<ApiState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(credentials) = body?;
    let registered = state.accounts.register(&credentials).await?;
    let token = registered.token.clone();

    Ok((StatusCode::OK, [(header::AUTHORIZATION, token)], Json(registered)).into_response())
}

/// `POST /api/account/login`
///
/// Responds with the bare token as a JSON string and in the `Authorization` header.
#[instrument(skip(state, body), name = "login_handler")]
pub async fn login_handler(
    State(state): State<ApiState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(credentials) = body?;
    let outcome = state.accounts.login(&credentials).await?;

    Ok((StatusCode::OK, [(header::AUTHORIZATION, outcome.token.clone())], Json(outcome.token))
        .into_response())
}
