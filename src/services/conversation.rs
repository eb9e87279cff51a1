// ABOUTME: Conversation engine shared by web chat, the public widget, and messenger webhooks
// ABOUTME: Enforces quota, runs the assistant on the thread, and persists the exchange
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::config::RunPollConfig;
use crate::constants::limits;
use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Assistant, Channel, Conversation, MessageRole, StoredMessage};
use crate::openai::{wait_for_run, AssistantsApi};
use crate::services::accounts::refresh_billing_period;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Number of recent thread messages searched for the run's reply
const REPLY_LOOKBACK: u32 = 10;

/// Characters of the first message used as a conversation title
const TITLE_CHARS: usize = 60;

/// Result of one user turn
#[derive(Debug, Clone, Serialize)]
pub struct ReplyOutcome {
    /// Conversation after the exchange was appended
    #[serde(skip)]
    pub conversation: Conversation,
    /// The stored user message
    pub user_message: StoredMessage,
    /// The stored assistant reply
    pub assistant_message: StoredMessage,
}

/// Reject the turn when the billed user has no messages left this month
///
/// Rolls the billing period over first when the month has turned.
///
/// # Errors
///
/// `QUOTA_EXCEEDED` when the plan quota is used up, `RESOURCE_NOT_FOUND` if
/// the user no longer exists
pub async fn check_quota(database: &Database, user_id: Uuid) -> AppResult<()> {
    let user = refresh_billing_period(database, user_id).await?;
    if user.remaining_messages() == Some(0) {
        return Err(AppError::new(
            ErrorCode::QuotaExceeded,
            format!(
                "Monthly message quota of the {} plan is used up",
                user.plan.as_str()
            ),
        ));
    }
    Ok(())
}

/// Create a conversation backed by a fresh `OpenAI` thread
///
/// # Errors
///
/// Returns an error if the thread or the row cannot be created
pub async fn start_conversation(
    database: &Database,
    api: &dyn AssistantsApi,
    assistant: &Assistant,
    channel: Channel,
    external_chat_id: Option<String>,
    title: Option<String>,
) -> AppResult<Conversation> {
    let thread = api.create_thread().await?;
    let now = Utc::now();
    let conversation = Conversation {
        id: Uuid::new_v4(),
        assistant_id: assistant.id,
        user_id: assistant.user_id,
        thread_id: Some(thread.id),
        channel,
        external_chat_id,
        title: title
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .unwrap_or_default(),
        messages: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    database.create_conversation(&conversation).await?;
    info!(
        conversation_id = %conversation.id,
        assistant_id = %assistant.id,
        channel = channel.as_str(),
        "Started conversation"
    );
    Ok(conversation)
}

/// Find the conversation of an external chat or start one
///
/// # Errors
///
/// Returns an error if lookup or creation fails
pub async fn find_or_start_conversation(
    database: &Database,
    api: &dyn AssistantsApi,
    assistant: &Assistant,
    channel: Channel,
    external_chat_id: &str,
    title: Option<String>,
) -> AppResult<Conversation> {
    if let Some(existing) = database
        .find_conversation_by_external(assistant.id, channel, external_chat_id)
        .await?
    {
        return Ok(existing);
    }
    start_conversation(
        database,
        api,
        assistant,
        channel,
        Some(external_chat_id.to_owned()),
        title,
    )
    .await
}

/// Run one user turn through the assistant
///
/// The quota is charged to the conversation's user, which is the assistant
/// owner for widget and messenger chats.
///
/// # Errors
///
/// - `INVALID_INPUT` for empty or oversized messages
/// - `QUOTA_EXCEEDED` when the billed user has no messages left
/// - `UNPROCESSABLE_CONTENT` when the assistant has no `OpenAI` counterpart
/// - upstream errors from the thread, run or poll
pub async fn reply(
    database: &Database,
    api: &dyn AssistantsApi,
    poll: RunPollConfig,
    mut conversation: Conversation,
    assistant: &Assistant,
    content: &str,
) -> AppResult<ReplyOutcome> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::invalid_input("Message content is required"));
    }
    if content.chars().count() > limits::MAX_MESSAGE_CHARS {
        return Err(AppError::invalid_input(format!(
            "Message exceeds {} characters",
            limits::MAX_MESSAGE_CHARS
        )));
    }
    check_quota(database, conversation.user_id).await?;

    let openai_assistant_id = assistant.openai_assistant_id.as_deref().ok_or_else(|| {
        AppError::new(
            ErrorCode::UnprocessableContent,
            "Assistant is not deployed to OpenAI",
        )
    })?;

    let thread_id = if let Some(thread_id) = conversation.thread_id.clone() {
        thread_id
    } else {
        let thread = api.create_thread().await?;
        conversation.thread_id = Some(thread.id.clone());
        thread.id
    };

    api.create_message(&thread_id, content).await?;
    let run = api.create_run(&thread_id, openai_assistant_id).await?;
    let run = wait_for_run(api, &thread_id, &run.id, poll).await?;

    let messages = api.list_messages(&thread_id, REPLY_LOOKBACK).await?;
    let reply_text = messages
        .iter()
        .filter(|m| m.role == MessageRole::Assistant.as_str())
        .find(|m| m.run_id.as_deref().is_none_or(|id| id == run.id))
        .map(crate::openai::ThreadMessage::text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AppError::external_service("OpenAI", "Run completed without a reply"))?;

    let user_message = StoredMessage::user(content);
    let assistant_message = StoredMessage::assistant(reply_text);
    if conversation.title.is_empty() {
        conversation.title = content.chars().take(TITLE_CHARS).collect();
    }
    conversation.messages.push(user_message.clone());
    conversation.messages.push(assistant_message.clone());
    conversation.updated_at = Utc::now();
    database.update_conversation(&conversation).await?;

    database
        .increment_messages_used(conversation.user_id)
        .await?;
    if let Err(e) = database.update_last_active(conversation.user_id).await {
        warn!(user_id = %conversation.user_id, "Failed to update last_active: {e}");
    }

    Ok(ReplyOutcome {
        conversation,
        user_message,
        assistant_message,
    })
}
