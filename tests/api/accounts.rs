use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use passkeeper::domain::AccountId;
use serde_json::{json, Value};

use crate::support::{authorization_header, read_json, send_request, setup_test_app};

#[tokio::test]
async fn register_returns_account_and_token() {
    let app = setup_test_app().await;

    let response = send_request(
        &app,
        Method::POST,
        "/api/account/register",
        None,
        Some(json!({ "login": "alice", "password": "s3cret!" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let token = authorization_header(&response);
    assert!(!token.is_empty());

    let body: Value = read_json(response).await;
    assert_eq!(body["login"], "alice");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let owner = app.tokens().validate(&token).unwrap();
    assert_eq!(body["id"], json!(owner.get()));
}

#[tokio::test]
async fn duplicate_login_conflicts() {
    let app = setup_test_app().await;
    app.register("alice", "s3cret!").await;

    let response = send_request(
        &app,
        Method::POST,
        "/api/account/register",
        None,
        Some(json!({ "login": "alice", "password": "another1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn short_credentials_are_rejected() {
    let app = setup_test_app().await;

    for body in [
        json!({ "login": "al", "password": "s3cret!" }),
        json!({ "login": "alice", "password": "12345" }),
    ] {
        let response =
            send_request(&app, Method::POST, "/api/account/register", None, Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let app = setup_test_app().await;

    let response = crate::support::send_raw(
        &app,
        Method::POST,
        "/api/account/login",
        "",
        "{not json",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_returns_token_in_header_and_body() {
    let app = setup_test_app().await;
    let registered = app.register("alice", "s3cret!").await;

    let response = send_request(
        &app,
        Method::POST,
        "/api/account/login",
        None,
        Some(json!({ "login": "alice", "password": "s3cret!" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let header_token = authorization_header(&response);
    let body_token: String = read_json(response).await;
    assert_eq!(header_token, body_token);

    let tokens = app.tokens();
    assert_eq!(tokens.validate(&body_token).unwrap(), tokens.validate(&registered).unwrap());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = setup_test_app().await;
    app.register("alice", "s3cret!").await;

    let wrong_password = send_request(
        &app,
        Method::POST,
        "/api/account/login",
        None,
        Some(json!({ "login": "alice", "password": "wrong-password" })),
    )
    .await;
    let unknown_login = send_request(
        &app,
        Method::POST,
        "/api/account/login",
        None,
        Some(json!({ "login": "nobody", "password": "s3cret!" })),
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_login.status(), StatusCode::UNAUTHORIZED);

    let first: Value = read_json(wrong_password).await;
    let second: Value = read_json(unknown_login).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn secured_routes_require_a_valid_token() {
    let app = setup_test_app().await;

    let missing = send_request(&app, Method::GET, "/api/secrets", None, None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let garbage = send_request(&app, Method::GET, "/api/secrets", Some("not-a-token"), None).await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = setup_test_app().await;
    app.register("alice", "s3cret!").await;

    let expired = app
        .tokens()
        .issue_at(AccountId::new(1), Utc::now() - Duration::hours(3))
        .unwrap();

    let response = send_request(&app, Method::GET, "/api/secrets", Some(&expired), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_prefix_is_accepted() {
    let app = setup_test_app().await;
    let token = app.register("alice", "s3cret!").await;

    let bearer = format!("Bearer {}", token);
    let response = send_request(&app, Method::GET, "/api/secrets", Some(&bearer), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_is_public() {
    let app = setup_test_app().await;

    let response = send_request(&app, Method::GET, "/healthz", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body["status"], "ok");
}
