// ABOUTME: Public widget chat endpoint used by the embeddable snippet on customer sites
// ABOUTME: Conversations are keyed by browser session id and billed to the assistant owner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::parse_id;
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::Channel;
use crate::resources::ServerResources;
use crate::services::conversation;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Longest accepted browser session id
const MAX_SESSION_ID_CHARS: usize = 128;

/// Widget chat request
#[derive(Debug, Deserialize)]
pub struct WidgetChatRequest {
    /// Browser session id generated by the snippet
    pub session_id: String,
    /// Visitor message
    pub message: String,
}

/// Widget chat reply
#[derive(Debug, Serialize)]
pub struct WidgetChatResponse {
    /// Assistant answer
    pub reply: String,
    /// Conversation the exchange was stored in
    pub conversation_id: Uuid,
}

/// Public widget routes
pub struct WidgetRoutes;

impl WidgetRoutes {
    /// Create the public widget routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/widget/:assistant_id/chat", post(Self::handle_chat))
            .with_state(resources)
    }

    async fn handle_chat(
        State(resources): State<Arc<ServerResources>>,
        Path(assistant_id): Path<String>,
        Json(request): Json<WidgetChatRequest>,
    ) -> Result<Response, AppError> {
        let assistant_id = parse_id(&assistant_id, "assistant")?;
        let session_id = request.session_id.trim();
        if session_id.is_empty() || session_id.chars().count() > MAX_SESSION_ID_CHARS {
            return Err(AppError::invalid_input("session_id is required"));
        }

        let assistant = resources
            .database
            .get_assistant(assistant_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or_else(|| AppError::not_found("Assistant"))?;

        let conversation = conversation::find_or_start_conversation(
            &resources.database,
            resources.openai.as_ref(),
            &assistant,
            Channel::Widget,
            session_id,
            None,
        )
        .await?;
        let outcome = conversation::reply(
            &resources.database,
            resources.openai.as_ref(),
            resources.config.run_poll,
            conversation,
            &assistant,
            &request.message,
        )
        .await?;

        Ok((
            StatusCode::OK,
            Json(WidgetChatResponse {
                reply: outcome.assistant_message.content,
                conversation_id: outcome.conversation.id,
            }),
        )
            .into_response())
    }
}
