// ABOUTME: Web chat route handlers for conversations and their message exchange
// ABOUTME: Sending a message runs the assistant on its OpenAI thread and stores both turns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::{owned_assistant, parse_id};
use crate::database_plugins::shared::validation::validate_ownership;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::middleware::authenticate;
use crate::models::{Channel, Conversation};
use crate::resources::ServerResources;
use crate::services::conversation;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Conversation creation request
#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    /// Assistant to talk to
    pub assistant_id: Uuid,
    /// Optional title, defaults to the first message
    #[serde(default)]
    pub title: Option<String>,
}

/// Conversation list filter
#[derive(Debug, Default, Deserialize)]
pub struct ListConversationsQuery {
    /// Only conversations with this assistant
    pub assistant_id: Option<Uuid>,
}

/// Message send request
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// User message text
    pub content: String,
}

/// Conversation routes
pub struct ConversationRoutes;

impl ConversationRoutes {
    /// Create all conversation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/conversations",
                post(Self::handle_create).get(Self::handle_list),
            )
            .route(
                "/api/conversations/:conversation_id",
                get(Self::handle_get).delete(Self::handle_delete),
            )
            .route(
                "/api/conversations/:conversation_id/messages",
                post(Self::handle_send_message),
            )
            .with_state(resources)
    }

    async fn owned_conversation(
        resources: &ServerResources,
        conversation_id: &str,
        user_id: Uuid,
    ) -> AppResult<Conversation> {
        let conversation_id = parse_id(conversation_id, "conversation")?;
        let conversation = resources
            .database
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Conversation"))?;
        validate_ownership(conversation.user_id, user_id, "Conversation")?;
        Ok(conversation)
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateConversationRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let assistant = owned_assistant(&resources, request.assistant_id, auth.user_id()).await?;
        let conversation = conversation::start_conversation(
            &resources.database,
            resources.openai.as_ref(),
            &assistant,
            Channel::Web,
            None,
            request.title,
        )
        .await?;
        Ok((StatusCode::CREATED, Json(conversation)).into_response())
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListConversationsQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let conversations = resources
            .database
            .list_conversations(auth.user_id(), query.assistant_id)
            .await?;
        Ok((StatusCode::OK, Json(conversations)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let conversation =
            Self::owned_conversation(&resources, &conversation_id, auth.user_id()).await?;
        Ok((StatusCode::OK, Json(conversation)).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let conversation =
            Self::owned_conversation(&resources, &conversation_id, auth.user_id()).await?;

        if let Some(thread_id) = conversation.thread_id.as_deref() {
            if let Err(e) = resources.openai.delete_thread(thread_id).await {
                warn!(thread_id, "Failed to delete OpenAI thread: {e}");
            }
        }
        resources
            .database
            .delete_conversation(conversation.id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_send_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
        Json(request): Json<SendMessageRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let conversation =
            Self::owned_conversation(&resources, &conversation_id, auth.user_id()).await?;
        let assistant =
            owned_assistant(&resources, conversation.assistant_id, auth.user_id()).await?;

        let outcome = conversation::reply(
            &resources.database,
            resources.openai.as_ref(),
            resources.config.run_poll,
            conversation,
            &assistant,
            &request.content,
        )
        .await?;
        Ok((StatusCode::OK, Json(outcome)).into_response())
    }
}
