//! Login, registration and logout.

use reqwest::StatusCode;
use serde_json::{Value, json};

use securevision_integration_tests::{TAKEN_EMAIL, TestContext, VALID_PASSWORD, location};

#[tokio::test]
async fn test_login_sets_session() {
    let ctx = TestContext::new().await;

    let resp = ctx.login().await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let body: Value = ctx.get("/auth/session").await.json().await.expect("Invalid JSON");
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["name"], "Test User");
}

#[tokio::test]
async fn test_login_returns_to_local_path_only() {
    let ctx = TestContext::new().await;
    let credentials = json!({"email": "ada@example.com", "password": VALID_PASSWORD});

    let resp = ctx
        .post_json("/auth/login?return_to=%2Fvideo-analytics", &credentials)
        .await;
    assert_eq!(location(&resp), "/video-analytics");

    let resp = ctx
        .post_json("/auth/login?return_to=https%3A%2F%2Fevil.example.com", &credentials)
        .await;
    assert_eq!(location(&resp), "/");

    let resp = ctx
        .post_json("/auth/login?return_to=%2F%2Fevil.example.com", &credentials)
        .await;
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_json(
            "/auth/login",
            &json!({"email": "ada@example.com", "password": "wrong"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["error"], "Invalid credentials");

    let body: Value = ctx.get("/auth/session").await.json().await.expect("Invalid JSON");
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_login_rejects_malformed_email_without_calling_backend() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_json(
            "/auth/login",
            &json!({"email": "ada", "password": VALID_PASSWORD}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_json(
            "/auth/register",
            &json!({"name": "Grace", "email": "grace@example.com", "password": "pw"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let registrations = ctx.backend.registrations();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0]["name"], "Grace");

    // Registration does not sign the visitor in.
    let body: Value = ctx.get("/auth/session").await.json().await.expect("Invalid JSON");
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_register_existing_email() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_json(
            "/auth/register",
            &json!({"name": "Grace", "email": TAKEN_EMAIL, "password": "pw"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn test_logout() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    ctx.add_to_cart(1).await;

    let resp = ctx.post_json("/auth/logout", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let body: Value = ctx.get("/auth/session").await.json().await.expect("Invalid JSON");
    assert_eq!(body["authenticated"], false);
    assert!(body["user"].is_null());
    // The cart belongs to the visitor, not the account.
    assert_eq!(body["cart_count"], 1);

    let resp = ctx.get("/checkout").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}
