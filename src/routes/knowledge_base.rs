// ABOUTME: Knowledge-base route handlers for multipart uploads into an assistant's vector store
// ABOUTME: Lists and removes entries together with their OpenAI files and stored objects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::{owned_assistant, parse_id, read_multipart};
use crate::database_plugins::shared::validation::validate_ownership;
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::middleware::authenticate;
use crate::resources::ServerResources;
use crate::services::knowledge::{self, KnowledgeUpload};
use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use std::sync::Arc;

/// Knowledge-base routes
pub struct KnowledgeBaseRoutes;

impl KnowledgeBaseRoutes {
    /// Create all knowledge-base routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/knowledge-base/:assistant_id",
                post(Self::handle_upload).get(Self::handle_list),
            )
            .route(
                "/api/knowledge-base/entry/:entry_id",
                delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Store, upload and index one file
    async fn handle_upload(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(assistant_id): Path<String>,
        multipart: Multipart,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let assistant_id = parse_id(&assistant_id, "assistant")?;
        let mut assistant = owned_assistant(&resources, assistant_id, auth.user_id()).await?;

        let file = read_multipart(multipart, resources.config.storage.max_upload_bytes)
            .await?
            .take_file("file")?;
        let entry = knowledge::ingest_upload(
            &resources.database,
            resources.openai.as_ref(),
            resources.storage.as_ref(),
            &mut assistant,
            KnowledgeUpload {
                file_name: file.file_name,
                mime_type: file.content_type,
                bytes: file.bytes,
            },
        )
        .await?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(assistant_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let assistant_id = parse_id(&assistant_id, "assistant")?;
        let assistant = owned_assistant(&resources, assistant_id, auth.user_id()).await?;
        let entries = resources.database.list_kb_entries(assistant.id).await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(entry_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let entry_id = parse_id(&entry_id, "entry")?;
        let entry = resources
            .database
            .get_kb_entry(entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Knowledge base entry"))?;
        validate_ownership(entry.user_id, auth.user_id(), "Knowledge base entry")?;

        knowledge::remove_entry(
            &resources.database,
            resources.openai.as_ref(),
            resources.storage.as_ref(),
            &entry,
        )
        .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
