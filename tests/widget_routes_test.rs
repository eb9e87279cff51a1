// ABOUTME: Integration tests for the public widget chat endpoint
// ABOUTME: Covers per-session conversations, owner billing, inactive assistants and open CORS
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use airlab_assistant_builder::database_plugins::DatabaseProvider;
use airlab_assistant_builder::models::BillingPlan;
use axum::http::StatusCode;
use common::{test_config, TestApp};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};
use tempfile::TempDir;
use uuid::Uuid;

#[tokio::test]
async fn test_widget_chat_keeps_one_conversation_per_session() {
    let app = TestApp::new().await;
    let (owner, _) = app.create_user("owner@example.com").await;
    let assistant = app.create_assistant(&owner, "Bot").await;
    app.openai.set_reply("Welcome!");
    let uri = format!("/api/widget/{}/chat", assistant.id);

    let first: Value = AxumTestRequest::post(&uri)
        .json(&json!({"session_id": "visitor-1", "message": "Hi"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(first["reply"], "Welcome!");

    let second: Value = AxumTestRequest::post(&uri)
        .json(&json!({"session_id": "visitor-1", "message": "Still there?"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(first["conversation_id"], second["conversation_id"]);

    let third: Value = AxumTestRequest::post(&uri)
        .json(&json!({"session_id": "visitor-2", "message": "Hello"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_ne!(first["conversation_id"], third["conversation_id"]);

    let stored = app.database().get_user(owner.id).await.unwrap().unwrap();
    assert_eq!(stored.messages_used, 3);
}

#[tokio::test]
async fn test_widget_chat_enforces_owner_quota() {
    let app = TestApp::new().await;
    let (owner, _) = app.create_user("owner@example.com").await;
    let assistant = app.create_assistant(&owner, "Bot").await;
    app.set_usage(&owner, BillingPlan::Free, 100).await;

    AxumTestRequest::post(&format!("/api/widget/{}/chat", assistant.id))
        .json(&json!({"session_id": "visitor-1", "message": "Hi"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_widget_chat_validates_input() {
    let app = TestApp::new().await;
    let (owner, _) = app.create_user("owner@example.com").await;
    let assistant = app.create_assistant(&owner, "Bot").await;
    let uri = format!("/api/widget/{}/chat", assistant.id);

    AxumTestRequest::post(&uri)
        .json(&json!({"session_id": "  ", "message": "Hi"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post(&uri)
        .json(&json!({"session_id": "x".repeat(129), "message": "Hi"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post(&format!("/api/widget/{}/chat", Uuid::new_v4()))
        .json(&json!({"session_id": "visitor", "message": "Hi"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inactive_assistant_is_hidden_from_widget() {
    let app = TestApp::new().await;
    let (owner, token) = app.create_user("owner@example.com").await;
    let assistant = app.create_assistant(&owner, "Bot").await;

    AxumTestRequest::put(&format!("/api/assistants/{}", assistant.id))
        .bearer(&token)
        .json(&json!({"is_active": false}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    AxumTestRequest::post(&format!("/api/widget/{}/chat", assistant.id))
        .json(&json!({"session_id": "visitor", "message": "Hi"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_widget_accepts_any_origin_when_api_is_restricted() {
    let object_dir = TempDir::new().unwrap();
    let mut config = test_config(&object_dir);
    config.cors.allowed_origins = vec!["https://app.airlab.test".to_owned()];
    let app = TestApp::with_config(object_dir, config).await;
    let (owner, token) = app.create_user("owner@example.com").await;
    let assistant = app.create_assistant(&owner, "Bot").await;
    let uri = format!("/api/widget/{}/chat", assistant.id);
    let customer_site = "https://customer-shop.example";

    let preflight = AxumTestRequest::options(&uri)
        .header("origin", customer_site)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(preflight.header("access-control-allow-origin").unwrap(), "*");

    let response = AxumTestRequest::post(&uri)
        .header("origin", customer_site)
        .json(&json!({"session_id": "visitor-1", "message": "Hi"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.header("access-control-allow-origin").unwrap(), "*");

    let api = AxumTestRequest::get("/api/assistants")
        .bearer(&token)
        .header("origin", customer_site)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    assert!(api.header("access-control-allow-origin").is_none());

    let api = AxumTestRequest::get("/api/assistants")
        .bearer(&token)
        .header("origin", "https://app.airlab.test")
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(
        api.header("access-control-allow-origin").unwrap(),
        "https://app.airlab.test"
    );
}
