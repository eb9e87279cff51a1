// ABOUTME: Bounded polling of an Assistants run until it reaches a terminal status
// ABOUTME: Gives up after a fixed number of attempts with a fixed sleep between them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::types::{Run, RunStatus};
use super::AssistantsApi;
use crate::config::RunPollConfig;
use crate::errors::{AppError, AppResult, ErrorCode};
use tracing::{debug, warn};

/// Poll a run until it completes
///
/// The run is checked at most `config.max_attempts` times, sleeping
/// `config.interval()` between checks.
///
/// # Errors
///
/// - `EXTERNAL_TIMEOUT` when the run is still active after the last attempt
/// - `EXTERNAL_SERVICE_ERROR` when the run ends `failed`, `cancelled` or `expired`
/// - any error returned by `retrieve_run`
pub async fn wait_for_run(
    api: &dyn AssistantsApi,
    thread_id: &str,
    run_id: &str,
    config: RunPollConfig,
) -> AppResult<Run> {
    for attempt in 1..=config.max_attempts {
        let run = api.retrieve_run(thread_id, run_id).await?;
        debug!(run_id, attempt, status = run.status.as_str(), "Polled run");

        match run.status {
            RunStatus::Completed => return Ok(run),
            RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired => {
                let reason = run
                    .last_error
                    .as_ref()
                    .map_or("no error details", |e| e.message.as_str());
                warn!(run_id, status = run.status.as_str(), "Run ended unsuccessfully: {reason}");
                return Err(AppError::external_service(
                    "OpenAI",
                    format!("Run {}: {reason}", run.status.as_str()),
                ));
            }
            _ => {}
        }

        if attempt < config.max_attempts {
            tokio::time::sleep(config.interval()).await;
        }
    }

    Err(AppError::new(
        ErrorCode::ExternalTimeout,
        format!(
            "Run {run_id} did not complete after {} attempts",
            config.max_attempts
        ),
    ))
}
