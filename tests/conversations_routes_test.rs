// ABOUTME: Integration tests for web chat conversations and the run polling exchange
// ABOUTME: Covers replies, quota enforcement and rollover, failed and timed-out runs, and deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use airlab_assistant_builder::database_plugins::DatabaseProvider;
use airlab_assistant_builder::models::{Assistant, BillingPlan, User};
use airlab_assistant_builder::openai::RunStatus;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::TestApp;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

async fn start_conversation(app: &TestApp, token: &str, assistant: &Assistant) -> String {
    let body: Value = AxumTestRequest::post("/api/conversations")
        .bearer(token)
        .json(&json!({"assistant_id": assistant.id}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert!(body["thread_id"].as_str().unwrap().starts_with("thread_"));
    body["id"].as_str().unwrap().to_owned()
}

async fn setup(app: &TestApp) -> (User, String, Assistant, String) {
    let (user, token) = app.create_user("owner@example.com").await;
    let assistant = app.create_assistant(&user, "Bot").await;
    let conversation_id = start_conversation(app, &token, &assistant).await;
    (user, token, assistant, conversation_id)
}

#[tokio::test]
async fn test_send_message_returns_reply_and_records_history() {
    let app = TestApp::new().await;
    let (user, token, _assistant, conversation_id) = setup(&app).await;
    app.openai
        .script_run_statuses(&[RunStatus::Queued, RunStatus::InProgress]);
    app.openai.set_reply("We open at 9am.");

    let outcome: Value =
        AxumTestRequest::post(&format!("/api/conversations/{conversation_id}/messages"))
            .bearer(&token)
            .json(&json!({"content": "When do you open?"}))
            .send(app.router())
            .await
            .assert_status(StatusCode::OK)
            .json();
    assert_eq!(outcome["assistant_message"]["content"], "We open at 9am.");
    assert_eq!(outcome["user_message"]["role"], "user");

    let conversation: Value = AxumTestRequest::get(&format!("/api/conversations/{conversation_id}"))
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(conversation["messages"].as_array().unwrap().len(), 2);
    assert_eq!(conversation["title"], "When do you open?");

    let polls = app
        .openai
        .calls()
        .iter()
        .filter(|c| c.starts_with("retrieve_run:"))
        .count();
    assert_eq!(polls, 3);

    let stored = app.database().get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.messages_used, 1);
}

#[tokio::test]
async fn test_quota_exceeded_returns_429() {
    let app = TestApp::new().await;
    let (user, token, _assistant, conversation_id) = setup(&app).await;
    app.set_usage(&user, BillingPlan::Free, 100).await;

    let body: Value =
        AxumTestRequest::post(&format!("/api/conversations/{conversation_id}/messages"))
            .bearer(&token)
            .json(&json!({"content": "Hello?"}))
            .send(app.router())
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS)
            .json();
    assert_eq!(body["code"], "QUOTA_EXCEEDED");
    assert!(!app.openai.called("create_run:"));
}

#[tokio::test]
async fn test_exhausted_quota_from_last_month_is_reset() {
    let app = TestApp::new().await;
    let mut user = User::new(
        "returning@example.com".to_owned(),
        "hash".to_owned(),
        None,
    );
    user.messages_used = 100;
    user.usage_period_start = Utc::now() - Duration::days(40);
    let token = app.insert_user(&user).await;
    let assistant = app.create_assistant(&user, "Bot").await;
    let conversation_id = start_conversation(&app, &token, &assistant).await;

    AxumTestRequest::post(&format!("/api/conversations/{conversation_id}/messages"))
        .bearer(&token)
        .json(&json!({"content": "Are you still there?"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);

    let stored = app.database().get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.messages_used, 1);
    assert!(stored.usage_period_start > user.usage_period_start);
}

#[tokio::test]
async fn test_failed_run_returns_bad_gateway_without_storing() {
    let app = TestApp::new().await;
    let (user, token, _assistant, conversation_id) = setup(&app).await;
    app.openai.script_run_statuses(&[RunStatus::Failed]);

    AxumTestRequest::post(&format!("/api/conversations/{conversation_id}/messages"))
        .bearer(&token)
        .json(&json!({"content": "Hello?"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_GATEWAY);

    let stored = app.database().get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.messages_used, 0);
}

#[tokio::test]
async fn test_run_that_never_finishes_times_out() {
    let app = TestApp::new().await;
    let (_user, token, _assistant, conversation_id) = setup(&app).await;
    app.openai.script_run_statuses(&[RunStatus::InProgress; 10]);

    let body: Value =
        AxumTestRequest::post(&format!("/api/conversations/{conversation_id}/messages"))
            .bearer(&token)
            .json(&json!({"content": "Hello?"}))
            .send(app.router())
            .await
            .assert_status(StatusCode::GATEWAY_TIMEOUT)
            .json();
    assert_eq!(body["code"], "EXTERNAL_TIMEOUT");
}

#[tokio::test]
async fn test_blank_message_rejected() {
    let app = TestApp::new().await;
    let (_user, token, _assistant, conversation_id) = setup(&app).await;

    AxumTestRequest::post(&format!("/api/conversations/{conversation_id}/messages"))
        .bearer(&token)
        .json(&json!({"content": "   "}))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_conversations_are_private_and_filterable() {
    let app = TestApp::new().await;
    let (user, token, assistant, conversation_id) = setup(&app).await;
    let other_assistant = app.create_assistant(&user, "Other bot").await;
    start_conversation(&app, &token, &other_assistant).await;
    let (_intruder, intruder_token) = app.create_user("intruder@example.com").await;

    let all: Vec<Value> = AxumTestRequest::get("/api/conversations")
        .bearer(&token)
        .send(app.router())
        .await
        .json();
    assert_eq!(all.len(), 2);

    let filtered: Vec<Value> =
        AxumTestRequest::get(&format!("/api/conversations?assistant_id={}", assistant.id))
            .bearer(&token)
            .send(app.router())
            .await
            .json();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["id"], conversation_id);

    AxumTestRequest::get(&format!("/api/conversations/{conversation_id}"))
        .bearer(&intruder_token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    AxumTestRequest::post("/api/conversations")
        .bearer(&intruder_token)
        .json(&json!({"assistant_id": assistant.id}))
        .send(app.router())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_conversation_removes_thread() {
    let app = TestApp::new().await;
    let (_user, token, _assistant, conversation_id) = setup(&app).await;

    AxumTestRequest::delete(&format!("/api/conversations/{conversation_id}"))
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(app.openai.called("delete_thread:"));
    AxumTestRequest::get(&format!("/api/conversations/{conversation_id}"))
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
