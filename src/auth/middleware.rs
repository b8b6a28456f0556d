//! Axum middleware that turns the `Authorization` header into a [`Principal`].

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use tracing::{field, info_span, warn, Instrument};

use crate::api::error::ApiError;
use crate::auth::jwt::TokenService;
use crate::auth::models::{AuthError, Principal};

pub type TokenServiceState = Arc<TokenService>;

/// Validate the request token and attach the caller's [`Principal`].
///
/// The header carries the bare token; a `Bearer ` prefix is accepted too.
pub async fn authenticate(
    State(tokens): State<TokenServiceState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let correlation_id = uuid::Uuid::new_v4();
    let span = info_span!(
        "auth_middleware.authenticate",
        http.method = %request.method(),
        http.path = %request.uri().path(),
        owner_id = field::Empty,
        correlation_id = %correlation_id
    );

    let principal = span.in_scope(|| {
        let header = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        principal_from_header(&tokens, header).inspect_err(|err| {
            warn!(%correlation_id, error = %err, "authentication failed");
        })
    });

    match principal {
        Ok(principal) => {
            span.record("owner_id", field::display(principal.owner_id()));
            request.extensions_mut().insert(principal);
            Ok(next.run(request).instrument(span).await)
        }
        Err(err) => Err(map_auth_error(err)),
    }
}

fn principal_from_header(tokens: &TokenService, header: &str) -> Result<Principal, AuthError> {
    let token = header.trim();
    let token = token.strip_prefix("Bearer ").map(str::trim).unwrap_or(token);
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let owner_id = tokens.validate(token)?;
    Ok(Principal::new(owner_id))
}

fn map_auth_error(err: AuthError) -> ApiError {
    match err {
        AuthError::MissingToken
        | AuthError::MalformedToken
        | AuthError::InvalidOrExpiredToken
        | AuthError::InvalidCredentials => ApiError::unauthorized(err.to_string()),
        AuthError::Forbidden => ApiError::forbidden(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtSettings;
    use crate::domain::AccountId;
    use axum::{http::StatusCode, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(Arc::new(JwtSettings::new("middleware-secret", 15))))
    }

    async fn whoami(Extension(principal): Extension<Principal>) -> String {
        principal.owner_id().to_string()
    }

    fn app(tokens: Arc<TokenService>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(tokens, authenticate))
    }

    async fn call(app: Router, header: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn raw_and_bearer_tokens_are_accepted() {
        let tokens = token_service();
        let token = tokens.issue(AccountId::new(9)).unwrap();

        let (status, body) = call(app(tokens.clone()), Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "9");

        let (status, body) = call(app(tokens), Some(&format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "9");
    }

    #[tokio::test]
    async fn missing_or_garbage_tokens_are_unauthorized() {
        let tokens = token_service();

        let (status, _) = call(app(tokens.clone()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(app(tokens.clone()), Some("Bearer ")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(app(tokens), Some("not-a-token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_from_other_secret_is_unauthorized() {
        let foreign = TokenService::new(Arc::new(JwtSettings::new("other-secret", 15)));
        let token = foreign.issue(AccountId::new(1)).unwrap();

        let (status, _) = call(app(token_service()), Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
