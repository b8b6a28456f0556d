use axum::http::{Method, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use passkeeper::domain::{CreditCard, KeyValue, Secret, SecretVariant, Text};
use passkeeper::secrets::dispatch;
use serde_json::{json, Value};

use crate::support::{read_json, send_raw, send_request, setup_test_app, TestApp};

async fn write(app: &TestApp, token: &str, body: Value) -> Secret {
    let response = send_request(app, Method::POST, "/api/secret", Some(token), Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await
}

#[tokio::test]
async fn text_secret_round_trip_and_foreign_read() {
    let app = setup_test_app().await;
    let alice = app.register("alice", "s3cret!").await;

    let saved = write(
        &app,
        &alice,
        json!({ "type": "Text", "meta": "note", "data": { "value": "hello" } }),
    )
    .await;
    assert!(saved.id.get() > 0);
    assert_eq!(saved.secret_type, "Text");
    assert_eq!(saved.metadata, "note");

    let path = format!("/api/secret/{}", saved.id);
    let response = send_request(&app, Method::GET, &path, Some(&alice), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored: Secret = read_json(response).await;
    let decoded = dispatch::resolve_stored(&stored).unwrap();
    assert_eq!(decoded.value, SecretVariant::Text(Text { value: "hello".into() }));
    assert_eq!(decoded.metadata, "note");

    let bob = app.register("bob", "hunter22").await;
    let response = send_request(&app, Method::GET, &path, Some(&bob), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn structured_types_are_stored_as_sent() {
    let app = setup_test_app().await;
    let token = app.register("alice", "s3cret!").await;

    let kv = write(
        &app,
        &token,
        json!({ "type": "KeyValue", "data": { "Key": "user", "Value": "pass" } }),
    )
    .await;
    let card = write(
        &app,
        &token,
        json!({
            "type": "CreditCard",
            "meta": "visa",
            "data": {
                "number": "4111111111111111",
                "expiration": "12/30",
                "cvv": "123",
                "cardholder": "Alice Example"
            }
        }),
    )
    .await;

    assert_eq!(
        dispatch::resolve_stored(&kv).unwrap().value,
        SecretVariant::KeyValue(KeyValue { key: "user".into(), value: "pass".into() })
    );
    assert_eq!(
        dispatch::resolve_stored(&card).unwrap().value,
        SecretVariant::CreditCard(CreditCard {
            number: "4111111111111111".into(),
            expiration: "12/30".into(),
            cvv: "123".into(),
            cardholder: "Alice Example".into(),
        })
    );
}

#[tokio::test]
async fn binary_secret_is_decoded_once() {
    let app = setup_test_app().await;
    let token = app.register("alice", "s3cret!").await;
    let raw = b"\x00\xffbinary payload";

    let saved = write(
        &app,
        &token,
        json!({
            "type": "ByteSlice",
            "meta": "blob|bin|Some bytes",
            "byteData": STANDARD.encode(raw)
        }),
    )
    .await;

    // At rest the value is the base64 text the client sent.
    assert_eq!(saved.value, STANDARD.encode(raw).into_bytes());
    assert_eq!(
        dispatch::resolve_stored(&saved).unwrap().value,
        SecretVariant::ByteSlice(raw.to_vec())
    );
}

#[tokio::test]
async fn overwrite_keeps_id_and_replaces_payload() {
    let app = setup_test_app().await;
    let token = app.register("alice", "s3cret!").await;

    let first = write(&app, &token, json!({ "type": "Text", "data": { "value": "v1" } })).await;
    let second = write(
        &app,
        &token,
        json!({ "id": first.id.get(), "type": "Text", "meta": "edited", "data": { "value": "v2" } }),
    )
    .await;
    assert_eq!(second.id, first.id);

    let response = send_request(&app, Method::GET, "/api/secrets", Some(&token), None).await;
    let secrets: Vec<Secret> = read_json(response).await;
    assert_eq!(secrets.len(), 1);
    assert_eq!(secrets[0].metadata, "edited");
    assert_eq!(
        dispatch::resolve_stored(&secrets[0]).unwrap().value,
        SecretVariant::Text(Text { value: "v2".into() })
    );
}

#[tokio::test]
async fn overwriting_a_foreign_secret_is_forbidden() {
    let app = setup_test_app().await;
    let alice = app.register("alice", "s3cret!").await;
    let bob = app.register("bob", "hunter22").await;

    let saved = write(&app, &alice, json!({ "type": "Text", "data": { "value": "mine" } })).await;

    let response = send_request(
        &app,
        Method::POST,
        "/api/secret",
        Some(&bob),
        Some(json!({ "id": saved.id.get(), "type": "Text", "data": { "value": "stolen" } })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let path = format!("/api/secret/{}", saved.id);
    let response = send_request(&app, Method::GET, &path, Some(&alice), None).await;
    let stored: Secret = read_json(response).await;
    assert_eq!(
        dispatch::resolve_stored(&stored).unwrap().value,
        SecretVariant::Text(Text { value: "mine".into() })
    );
}

#[tokio::test]
async fn list_only_returns_own_secrets_in_id_order() {
    let app = setup_test_app().await;
    let alice = app.register("alice", "s3cret!").await;
    let bob = app.register("bob", "hunter22").await;

    write(&app, &alice, json!({ "type": "Text", "data": { "value": "a1" } })).await;
    write(&app, &bob, json!({ "type": "Text", "data": { "value": "b1" } })).await;
    write(&app, &alice, json!({ "type": "Text", "data": { "value": "a2" } })).await;

    let response = send_request(&app, Method::GET, "/api/secrets", Some(&alice), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let secrets: Vec<Secret> = read_json(response).await;

    assert_eq!(secrets.len(), 2);
    assert!(secrets[0].id < secrets[1].id);
    assert!(secrets.iter().all(|secret| secret.owner_id == secrets[0].owner_id));

    let fresh = app.register("carol", "password1").await;
    let response = send_request(&app, Method::GET, "/api/secrets", Some(&fresh), None).await;
    let secrets: Vec<Secret> = read_json(response).await;
    assert!(secrets.is_empty());
}

#[tokio::test]
async fn delete_removes_secret_and_returns_null() {
    let app = setup_test_app().await;
    let alice = app.register("alice", "s3cret!").await;
    let bob = app.register("bob", "hunter22").await;

    let saved = write(&app, &alice, json!({ "type": "Text", "data": { "value": "bye" } })).await;
    let path = format!("/api/secret/{}", saved.id);

    let response = send_request(&app, Method::DELETE, &path, Some(&bob), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send_request(&app, Method::DELETE, &path, Some(&alice), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert!(body.is_null());

    let response = send_request(&app, Method::GET, &path, Some(&alice), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send_request(&app, Method::DELETE, &path, Some(&alice), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bad_requests_are_rejected() {
    let app = setup_test_app().await;
    let token = app.register("alice", "s3cret!").await;

    let response = send_request(&app, Method::GET, "/api/secret/abc", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_request(&app, Method::GET, "/api/secret/999", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    for body in [
        json!({ "type": "Password", "data": { "value": "x" } }),
        json!({ "type": "KeyValue", "data": "not an object" }),
        json!({ "id": -4, "type": "Text", "data": { "value": "x" } }),
    ] {
        let response =
            send_request(&app, Method::POST, "/api/secret", Some(&token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = send_raw(&app, Method::POST, "/api/secret", &token, "{\"type\":").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
