//! Admin authentication tests.
//!
//! Run with: `cargo test -p utkrisht-api --test auth_test`

mod helpers;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderValue, StatusCode};
use serde_json::{json, Value};
use utkrisht_core::models::UserRole;

use helpers::auth::{seed_admin, seed_user_with_role, TEST_ADMIN_EMAIL, TEST_ADMIN_PASSWORD};
use helpers::{admin_path, api_path, setup_test_app};

#[tokio::test]
async fn test_login_returns_usable_token() {
    let app = setup_test_app();
    seed_admin(&app);

    let response = app
        .client()
        .post(&api_path("/auth/login"))
        .json(&json!({ "email": TEST_ADMIN_EMAIL, "password": TEST_ADMIN_PASSWORD }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user"]["email"], TEST_ADMIN_EMAIL);
    assert!(body["user"].get("hashedPassword").is_none());
    let token = body["token"].as_str().unwrap();

    let response = app
        .client()
        .get(&admin_path("/inquiries"))
        .authorization_bearer(token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_email() {
    let app = setup_test_app();
    seed_admin(&app);

    let response = app
        .client()
        .post(&api_path("/auth/login"))
        .json(&json!({ "email": TEST_ADMIN_EMAIL, "password": "wrong-password" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .client()
        .post(&api_path("/auth/login"))
        .json(&json!({ "email": "nobody@utkrisht.test", "password": TEST_ADMIN_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_missing_or_bad_tokens() {
    let app = setup_test_app();

    let response = app.client().get(&admin_path("/projects")).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .client()
        .get(&admin_path("/projects"))
        .add_header(AUTHORIZATION, HeaderValue::from_static("Token abc"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .client()
        .get(&admin_path("/projects"))
        .authorization_bearer("not.a.jwt")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_superadmin_can_use_admin_routes() {
    let app = setup_test_app();
    let superadmin = seed_user_with_role(
        &app,
        "owner@utkrisht.test",
        "owner-password-123",
        UserRole::Superadmin,
    );

    let response = app
        .client()
        .get(&admin_path("/media"))
        .authorization_bearer(&superadmin.token)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_then_login_with_new_one() {
    let app = setup_test_app();
    let admin = seed_admin(&app);

    let response = app
        .client()
        .post(&admin_path("/settings/password"))
        .authorization_bearer(&admin.token)
        .json(&json!({
            "email": TEST_ADMIN_EMAIL,
            "currentPassword": TEST_ADMIN_PASSWORD,
            "newPassword": "a-much-better-password"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "success": true }));

    let response = app
        .client()
        .post(&api_path("/auth/login"))
        .json(&json!({ "email": TEST_ADMIN_EMAIL, "password": TEST_ADMIN_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .client()
        .post(&api_path("/auth/login"))
        .json(&json!({ "email": TEST_ADMIN_EMAIL, "password": "a-much-better-password" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_checks_current_password_and_user() {
    let app = setup_test_app();
    let admin = seed_admin(&app);

    let response = app
        .client()
        .post(&admin_path("/settings/password"))
        .authorization_bearer(&admin.token)
        .json(&json!({
            "email": TEST_ADMIN_EMAIL,
            "currentPassword": "not-it",
            "newPassword": "a-much-better-password"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .client()
        .post(&admin_path("/settings/password"))
        .authorization_bearer(&admin.token)
        .json(&json!({
            "email": "ghost@utkrisht.test",
            "currentPassword": TEST_ADMIN_PASSWORD,
            "newPassword": "a-much-better-password"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .client()
        .post(&admin_path("/settings/password"))
        .authorization_bearer(&admin.token)
        .json(&json!({
            "email": TEST_ADMIN_EMAIL,
            "currentPassword": TEST_ADMIN_PASSWORD,
            "newPassword": "short"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
