use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::auth::account_service::AccountService;
use crate::auth::jwt::{JwtSettings, TokenService};
use crate::auth::middleware::authenticate;
use crate::observability::trace_http_requests;
use crate::services::SecretService;
use crate::storage::DbPool;

use super::handlers::{
    delete_secret_handler, get_secret_handler, health_handler, list_secrets_handler,
    login_handler, register_handler, write_secret_handler,
};

#[derive(Clone)]
pub struct ApiState {
    pub accounts: AccountService,
    pub secrets: SecretService,
    pub tokens: Arc<TokenService>,
}

impl ApiState {
    /// Build the services over one pool and one immutable set of token settings.
    pub fn new(pool: DbPool, jwt_settings: Arc<JwtSettings>) -> Self {
        let tokens = Arc::new(TokenService::new(jwt_settings));
        Self {
            accounts: AccountService::with_sqlx(pool.clone(), tokens.clone()),
            secrets: SecretService::with_sqlx(pool),
            tokens,
        }
    }
}

pub fn build_router(state: ApiState) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.tokens.clone(), authenticate);

    let secured_api = Router::new()
        .route("/api/secret", post(write_secret_handler))
        .route("/api/secret/{id}", get(get_secret_handler).delete(delete_secret_handler))
        .route("/api/secrets", get(list_secrets_handler))
        .with_state(state.clone())
        .layer(auth_layer);

    let public_api = Router::new()
        .route("/api/account/register", post(register_handler))
        .route("/api/account/login", post(login_handler))
        .route("/healthz", get(health_handler))
        .with_state(state);

    public_api
        .merge(secured_api)
        .layer(middleware::from_fn(trace_http_requests))
        .layer(CatchPanicLayer::new())
}
