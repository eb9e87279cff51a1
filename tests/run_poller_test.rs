// ABOUTME: Tests for bounded run polling against the scripted Assistants fake
// ABOUTME: Verifies completion, terminal failures, and the attempt limit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use airlab_assistant_builder::config::RunPollConfig;
use airlab_assistant_builder::errors::ErrorCode;
use airlab_assistant_builder::openai::{wait_for_run, RunStatus};
use helpers::fakes::FakeAssistantsApi;

const FAST_POLL: RunPollConfig = RunPollConfig {
    max_attempts: 4,
    interval_ms: 1,
};

fn retrieve_count(api: &FakeAssistantsApi) -> usize {
    api.calls()
        .iter()
        .filter(|c| c.starts_with("retrieve_run:"))
        .count()
}

#[tokio::test]
async fn test_returns_once_run_completes() {
    let api = FakeAssistantsApi::default();
    api.script_run_statuses(&[RunStatus::Queued, RunStatus::InProgress]);

    let run = wait_for_run(&api, "thread_1", "run_1", FAST_POLL)
        .await
        .unwrap();

    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(retrieve_count(&api), 3);
}

#[tokio::test]
async fn test_failed_run_is_upstream_error_with_reason() {
    let api = FakeAssistantsApi::default();
    api.script_run_statuses(&[RunStatus::InProgress, RunStatus::Failed]);

    let err = wait_for_run(&api, "thread_1", "run_1", FAST_POLL)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalServiceError);
    assert!(err.message.contains("failed"), "{}", err.message);
    assert_eq!(retrieve_count(&api), 2);
}

#[tokio::test]
async fn test_cancelled_and_expired_runs_stop_polling() {
    for status in [RunStatus::Cancelled, RunStatus::Expired] {
        let api = FakeAssistantsApi::default();
        api.script_run_statuses(&[status]);

        let err = wait_for_run(&api, "thread_1", "run_1", FAST_POLL)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ExternalServiceError);
        assert!(err.message.contains(status.as_str()), "{}", err.message);
        assert_eq!(retrieve_count(&api), 1);
    }
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let api = FakeAssistantsApi::default();
    api.script_run_statuses(&[RunStatus::InProgress; 10]);

    let err = wait_for_run(&api, "thread_1", "run_1", FAST_POLL)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalTimeout);
    assert_eq!(err.http_status(), 504);
    assert_eq!(retrieve_count(&api), 4);
}

#[tokio::test]
async fn test_requires_action_keeps_polling() {
    let api = FakeAssistantsApi::default();
    api.script_run_statuses(&[RunStatus::RequiresAction, RunStatus::Cancelling]);

    let err = wait_for_run(
        &api,
        "thread_1",
        "run_1",
        RunPollConfig {
            max_attempts: 2,
            interval_ms: 1,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalTimeout);
}
