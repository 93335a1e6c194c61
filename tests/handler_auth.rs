mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::MemoryStore;

#[tokio::test]
async fn test_register_returns_token_and_user() {
    let store = MemoryStore::new();
    let server = common::create_test_server(&store);

    let response = server
        .post("/auth/register")
        .json(&json!({ "email": "Ada@Example.com", "password": common::PASSWORD }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<Value>();
    assert_eq!(json["message"], "User created successfully");
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 3600);
    assert!(json["access_token"].as_str().unwrap().split('.').count() == 3);
    assert_eq!(json["user"]["email"], "ada@example.com");
    assert_eq!(json["user"]["username"], "ada");
    assert_eq!(json["user"]["is_verified"], false);
    assert!(json["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let store = MemoryStore::new();
    let server = common::create_test_server(&store);
    common::register(&server, "ada@example.com").await;

    let response = server
        .post("/auth/register")
        .json(&json!({ "email": "ADA@example.com", "password": "another-password" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<Value>();
    assert_eq!(json["kind"], "conflict");
    assert_eq!(json["message"], "Email already exists");
    assert_eq!(store.user_count(), 1);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let store = MemoryStore::new();
    let server = common::create_test_server(&store);

    server
        .post("/auth/register")
        .json(&json!({ "email": "a@example.com", "password": common::PASSWORD, "username": "ada" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/auth/register")
        .json(&json!({ "email": "b@example.com", "password": common::PASSWORD, "username": "ada" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Username already exists");
}

#[tokio::test]
async fn test_register_default_username_taken() {
    let store = MemoryStore::new();
    let server = common::create_test_server(&store);
    common::register(&server, "ada@example.com").await;

    let response = server
        .post("/auth/register")
        .json(&json!({ "email": "ada@other.org", "password": common::PASSWORD }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert!(response.json::<Value>()["user"]["username"].is_null());
}

#[tokio::test]
async fn test_register_validation() {
    let store = MemoryStore::new();
    let server = common::create_test_server(&store);

    for body in [
        json!({ "email": "not-an-email", "password": common::PASSWORD }),
        json!({ "email": "ada@example.com", "password": "short" }),
        json!({ "email": "ada@example.com" }),
    ] {
        let response = server.post("/auth/register").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    assert_eq!(store.user_count(), 0);
}

#[tokio::test]
async fn test_login_success() {
    let store = MemoryStore::new();
    let server = common::create_test_server(&store);
    common::register(&server, "ada@example.com").await;

    let response = server
        .post("/auth/login")
        .json(&json!({ "email": "ADA@example.com", "password": common::PASSWORD }))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["message"], "Logged in successfully");

    let token = json["access_token"].as_str().unwrap();
    server
        .get("/auth/me")
        .authorization_bearer(token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let store = MemoryStore::new();
    let server = common::create_test_server(&store);
    common::register(&server, "ada@example.com").await;

    let wrong_password = server
        .post("/auth/login")
        .json(&json!({ "email": "ada@example.com", "password": "wrong-password" }))
        .await;
    let unknown_email = server
        .post("/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": common::PASSWORD }))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.json::<Value>()["message"],
        unknown_email.json::<Value>()["message"]
    );
}

#[tokio::test]
async fn test_me_returns_profile() {
    let store = MemoryStore::new();
    let server = common::create_test_server(&store);
    let token = common::register(&server, "ada@example.com").await;

    let response = server.get("/auth/me").authorization_bearer(&token).await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["email"], "ada@example.com");
    assert!(json["id"].is_i64());
}

#[tokio::test]
async fn test_me_rejects_bad_tokens() {
    let store = MemoryStore::new();
    let server = common::create_test_server(&store);

    server
        .get("/auth/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/auth/me")
        .authorization_bearer("a.b.c")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), "Bearer");
}

#[tokio::test]
async fn test_delete_me_cascades_to_urls() {
    let store = MemoryStore::new();
    let server = common::create_test_server(&store);
    let ada = common::register(&server, "ada@example.com").await;
    let bob = common::register(&server, "bob@example.com").await;

    for code in ["ada1", "ada2"] {
        common::shorten(
            &server,
            &ada,
            json!({ "url": "https://example.com", "shortCode": code }),
        )
        .await;
    }
    common::shorten(
        &server,
        &bob,
        json!({ "url": "https://example.com", "shortCode": "bob1" }),
    )
    .await;

    server
        .delete("/auth/me")
        .authorization_bearer(&ada)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert_eq!(store.user_count(), 1);
    assert_eq!(store.url_count(), 1);
    server.get("/ada1").await.assert_status(StatusCode::NOT_FOUND);
    server.get("/bob1").await.assert_status(StatusCode::FOUND);

    server
        .get("/auth/me")
        .authorization_bearer(&ada)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
