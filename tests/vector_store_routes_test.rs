// ABOUTME: Integration tests for the authenticated vector store pass-through routes
// ABOUTME: Covers store creation, file attach/list/remove, and id validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::TestApp;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

#[tokio::test]
async fn test_store_and_file_lifecycle() {
    let app = TestApp::new().await;
    let (_user, token) = app.create_user("owner@example.com").await;

    let store: Value = AxumTestRequest::post("/api/vector-store")
        .bearer(&token)
        .json(&json!({"name": "  Shared docs "}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let store_id = store["id"].as_str().unwrap().to_owned();
    assert_eq!(store["name"], "Shared docs");

    AxumTestRequest::post(&format!("/api/vector-store/{store_id}/files"))
        .bearer(&token)
        .json(&json!({"file_id": "file-abc"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let listed: Value = AxumTestRequest::get(&format!("/api/vector-store/{store_id}/files"))
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed["files"][0]["id"], "file-abc");

    AxumTestRequest::delete(&format!("/api/vector-store/{store_id}/files/file-abc"))
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    AxumTestRequest::delete(&format!("/api/vector-store/{store_id}"))
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(app
        .openai
        .called(&format!("remove_vector_store_file:{store_id}:file-abc")));
    assert!(app.openai.called(&format!("delete_vector_store:{store_id}")));
}

#[tokio::test]
async fn test_requires_authentication() {
    let app = TestApp::new().await;

    AxumTestRequest::post("/api/vector-store")
        .json(&json!({"name": "Docs"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert!(!app.openai.called("create_vector_store"));
}

#[tokio::test]
async fn test_rejects_blank_name_and_malformed_ids() {
    let app = TestApp::new().await;
    let (_user, token) = app.create_user("owner@example.com").await;

    AxumTestRequest::post("/api/vector-store")
        .bearer(&token)
        .json(&json!({"name": "   "}))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::delete("/api/vector-store/vs.1")
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/vector-store/vs_1/files")
        .bearer(&token)
        .json(&json!({"file_id": "file/../x"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(!app.openai.called("delete_vector_store"));
    assert!(!app.openai.called("add_vector_store_file"));
}
