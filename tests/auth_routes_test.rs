// ABOUTME: Integration tests for registration, login, logout and session resolution
// ABOUTME: Drives the full router with bearer tokens and session cookies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{TestApp, TEST_PASSWORD};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

#[tokio::test]
async fn test_register_signs_in_and_sets_cookie() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "email": "Owner@Example.com",
            "password": "long-enough-password",
            "display_name": "Owner"
        }))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let cookie = response.header("set-cookie").unwrap();
    assert!(cookie.starts_with("airlab_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(!cookie.contains("Secure"));

    let body: Value = response.json();
    assert_eq!(body["user"]["email"], "owner@example.com");
    assert_eq!(body["user"]["plan"], "free");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["token"].as_str().unwrap();
    let me: Value = AxumTestRequest::get("/api/auth/me")
        .bearer(token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(me["display_name"], "Owner");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_short_passwords() {
    let app = TestApp::new().await;
    app.create_user("taken@example.com").await;

    let body: Value = AxumTestRequest::post("/api/auth/register")
        .json(&json!({"email": "taken@example.com", "password": "long-enough-password"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CONFLICT)
        .json();
    assert_eq!(body["code"], "RESOURCE_ALREADY_EXISTS");

    AxumTestRequest::post("/api/auth/register")
        .json(&json!({"email": "new@example.com", "password": "short"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_login_returns_401() {
    let app = TestApp::new().await;
    app.create_user("user@example.com").await;

    let body: Value = AxumTestRequest::post("/api/auth/login")
        .json(&json!({"email": "user@example.com", "password": "wrong-password"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json();
    assert_eq!(body["error"], "Invalid email or password");
    assert!(body["code"].is_string());

    AxumTestRequest::post("/api/auth/login")
        .json(&json!({"email": "nobody@example.com", "password": TEST_PASSWORD}))
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_then_logout_invalidates_token() {
    let app = TestApp::new().await;
    app.create_user("user@example.com").await;

    let body: Value = AxumTestRequest::post("/api/auth/login")
        .json(&json!({"email": "user@example.com", "password": TEST_PASSWORD}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let token = body["token"].as_str().unwrap().to_owned();

    let response = AxumTestRequest::post("/api/auth/logout")
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    assert!(response.header("set-cookie").unwrap().contains("Max-Age=0"));

    AxumTestRequest::get("/api/auth/me")
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_authenticates() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("cookie@example.com").await;

    let me: Value = AxumTestRequest::get("/api/auth/me")
        .header("cookie", &format!("theme=dark; airlab_session={token}"))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(me["id"], user.id.to_string());
}

#[tokio::test]
async fn test_missing_and_garbage_tokens() {
    let app = TestApp::new().await;

    let body: Value = AxumTestRequest::get("/api/assistants")
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json();
    assert_eq!(body["code"], "AUTH_REQUIRED");

    AxumTestRequest::get("/api/assistants")
        .bearer("not-a-token")
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deactivated_user_cannot_login() {
    let app = TestApp::new().await;
    let (admin, admin_token) = app.create_admin("admin@example.com").await;
    let (user, _) = app.create_user("user@example.com").await;
    assert_ne!(admin.id, user.id);

    AxumTestRequest::put(&format!("/api/admin/users/{}", user.id))
        .bearer(&admin_token)
        .json(&json!({"is_active": false}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    AxumTestRequest::post("/api/auth/login")
        .json(&json!({"email": "user@example.com", "password": TEST_PASSWORD}))
        .send(app.router())
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
