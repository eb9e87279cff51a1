// ABOUTME: Integration tests for the reqwest OpenAI client against a mock HTTP server
// ABOUTME: Covers headers, request bodies, response decoding, and upstream error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use airlab_assistant_builder::config::OpenAiConfig;
use airlab_assistant_builder::errors::ErrorCode;
use airlab_assistant_builder::openai::{
    AssistantParams, AssistantsApi, ChatCompletionRequest, ChatMessage, OpenAiClient, RunStatus,
};
use mockito::Matcher;
use serde_json::json;

fn client_for(server: &mockito::ServerGuard) -> OpenAiClient {
    OpenAiClient::new(&OpenAiConfig {
        api_key: Some("sk-test".to_owned()),
        base_url: format!("{}/", server.url()),
        default_model: "gpt-4o-mini".to_owned(),
        summary_model: "gpt-4o-mini".to_owned(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn params() -> AssistantParams {
    AssistantParams {
        model: "gpt-4o-mini".to_owned(),
        name: Some("Support bot".to_owned()),
        description: None,
        instructions: Some("Be helpful".to_owned()),
        temperature: Some(0.7),
        tools: Vec::new(),
        tool_resources: None,
    }
}

#[tokio::test]
async fn test_create_assistant_sends_auth_and_beta_headers() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/assistants")
        .match_header("authorization", "Bearer sk-test")
        .match_header("openai-beta", "assistants=v2")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "name": "Support bot",
            "instructions": "Be helpful"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"asst_123","object":"assistant","model":"gpt-4o-mini"}"#)
        .create_async()
        .await;

    let remote = client_for(&server).create_assistant(&params()).await.unwrap();

    assert_eq!(remote.id, "asst_123");
    assert_eq!(remote.model, "gpt-4o-mini");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_run_lifecycle_endpoints() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/threads/thread_1/runs")
        .match_body(Matcher::Json(json!({ "assistant_id": "asst_1" })))
        .with_status(200)
        .with_body(r#"{"id":"run_1","status":"queued"}"#)
        .create_async()
        .await;
    let retrieve = server
        .mock("GET", "/threads/thread_1/runs/run_1")
        .with_status(200)
        .with_body(
            r#"{"id":"run_1","status":"failed","last_error":{"code":"server_error","message":"boom"}}"#,
        )
        .create_async()
        .await;
    let client = client_for(&server);

    let run = client.create_run("thread_1", "asst_1").await.unwrap();
    assert_eq!(run.status, RunStatus::Queued);

    let run = client.retrieve_run("thread_1", "run_1").await.unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.last_error.unwrap().message, "boom");

    create.assert_async().await;
    retrieve.assert_async().await;
}

#[tokio::test]
async fn test_unknown_run_status_decodes() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/threads/t/runs/r")
        .with_status(200)
        .with_body(r#"{"id":"r","status":"something_new"}"#)
        .create_async()
        .await;

    let run = client_for(&server).retrieve_run("t", "r").await.unwrap();

    assert_eq!(run.status, RunStatus::Unknown);
    assert!(!run.status.is_terminal());
}

#[tokio::test]
async fn test_list_messages_extracts_text_parts() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/threads/thread_1/messages")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "10".into()),
            Matcher::UrlEncoded("order".into(), "desc".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "object": "list",
                "data": [{
                    "id": "msg_2",
                    "role": "assistant",
                    "run_id": "run_1",
                    "created_at": 1_700_000_000,
                    "content": [
                        {"type": "text", "text": {"value": "First part", "annotations": []}},
                        {"type": "image_file", "image_file": {"file_id": "file_9"}},
                        {"type": "text", "text": {"value": "Second part", "annotations": []}}
                    ]
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let messages = client_for(&server)
        .list_messages("thread_1", 10)
        .await
        .unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, "assistant");
    assert_eq!(messages[0].run_id.as_deref(), Some("run_1"));
    assert_eq!(messages[0].text(), "First part\nSecond part");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_thread_accepts_deletion_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/threads/thread_1")
        .with_status(200)
        .with_body(r#"{"id":"thread_1","object":"thread.deleted","deleted":true}"#)
        .create_async()
        .await;

    client_for(&server).delete_thread("thread_1").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_completion_returns_first_choice() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "system", "content": "Summarize"}, {"role": "user", "content": "Long text"}]
        })))
        .with_status(200)
        .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Short text"}}]}"#)
        .create_async()
        .await;

    let request = ChatCompletionRequest {
        model: "gpt-4o-mini".to_owned(),
        messages: vec![ChatMessage::system("Summarize"), ChatMessage::user("Long text")],
        temperature: None,
        max_tokens: None,
        response_format: None,
    };
    let reply = client_for(&server).chat_completion(&request).await.unwrap();

    assert_eq!(reply, "Short text");
}

#[tokio::test]
async fn test_chat_completion_without_choices_is_upstream_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let request = ChatCompletionRequest {
        model: "gpt-4o-mini".to_owned(),
        messages: vec![ChatMessage::user("Hi")],
        temperature: None,
        max_tokens: None,
        response_format: None,
    };
    let err = client_for(&server)
        .chat_completion(&request)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalServiceError);
}

#[tokio::test]
async fn test_upstream_status_codes_map_to_error_codes() {
    let cases = [
        (401, ErrorCode::ExternalAuthFailed, 502),
        (429, ErrorCode::ExternalRateLimited, 429),
        (404, ErrorCode::ResourceNotFound, 404),
        (500, ErrorCode::ExternalServiceError, 502),
    ];

    for (status, code, http_status) in cases {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/threads")
            .with_status(status)
            .with_body(r#"{"error":{"message":"upstream said no","type":"test_error"}}"#)
            .create_async()
            .await;

        let err = client_for(&server).create_thread().await.unwrap_err();

        assert_eq!(err.code, code, "status {status}");
        assert_eq!(err.http_status(), http_status, "status {status}");
        assert!(err.message.contains("upstream said no"), "{}", err.message);
    }
}

#[tokio::test]
async fn test_malformed_success_body_is_upstream_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/vector_stores")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = client_for(&server)
        .create_vector_store("Bot Knowledge Base")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalServiceError);
}

#[tokio::test]
async fn test_missing_api_key_fails_without_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/threads")
        .expect(0)
        .create_async()
        .await;
    let client = OpenAiClient::new(&OpenAiConfig {
        api_key: None,
        base_url: server.url(),
        default_model: "gpt-4o-mini".to_owned(),
        summary_model: "gpt-4o-mini".to_owned(),
        timeout_secs: 5,
    })
    .unwrap();

    let err = client.create_thread().await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ConfigMissing);
    mock.assert_async().await;
}
