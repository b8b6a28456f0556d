use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use passkeeper::{
    api::{build_router, ApiState},
    auth::{JwtSettings, TokenService},
    config::DatabaseConfig,
    storage::{create_pool, DbPool},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub pool: DbPool,
    pub settings: Arc<JwtSettings>,
    state: ApiState,
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// A token service sharing the application's signing settings.
    pub fn tokens(&self) -> TokenService {
        TokenService::new(self.settings.clone())
    }

    /// Register `login` and return the token from the `Authorization` header.
    pub async fn register(&self, login: &str, password: &str) -> String {
        let response = send_request(
            self,
            Method::POST,
            "/api/account/register",
            None,
            Some(serde_json::json!({ "login": login, "password": password })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        authorization_header(&response)
    }
}

pub async fn setup_test_app() -> TestApp {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        auto_migrate: true,
        ..Default::default()
    };
    let pool = create_pool(&config).await.expect("create sqlite pool");
    let settings = Arc::new(JwtSettings::new(JWT_SECRET, 60));
    let state = ApiState::new(pool.clone(), settings.clone());

    TestApp { pool, settings, state }
}

pub async fn send_request(
    app: &TestApp,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };

    app.router().oneshot(request).await.expect("request")
}

pub async fn send_raw(app: &TestApp, method: Method, path: &str, token: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::AUTHORIZATION, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");

    app.router().oneshot(request).await.expect("request")
}

pub fn authorization_header(response: &Response) -> String {
    response
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .expect("authorization header")
        .to_string()
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}
