// ABOUTME: Google Docs route handlers importing public documents into an assistant's knowledge
// ABOUTME: Import fetches, strips, summarizes and indexes; failed indexing is stored, not thrown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::{owned_assistant, parse_id};
use crate::database_plugins::shared::validation::validate_ownership;
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::middleware::authenticate;
use crate::resources::ServerResources;
use crate::services::google_docs;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Import request
#[derive(Debug, Deserialize)]
pub struct ImportDocumentRequest {
    /// Assistant receiving the document
    pub assistant_id: Uuid,
    /// Document URL or bare id
    pub url: String,
}

/// List filter
#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    /// Assistant whose documents to list
    pub assistant_id: Uuid,
}

/// Google Docs routes
pub struct GoogleDocsRoutes;

impl GoogleDocsRoutes {
    /// Create all Google Docs routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/google-docs",
                post(Self::handle_import).get(Self::handle_list),
            )
            .route("/api/google-docs/:document_id", delete(Self::handle_delete))
            .with_state(resources)
    }

    async fn handle_import(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<ImportDocumentRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut assistant =
            owned_assistant(&resources, request.assistant_id, auth.user_id()).await?;

        let document = google_docs::import_document(
            &resources.database,
            resources.openai.as_ref(),
            resources.fetcher.as_ref(),
            &resources.config.openai.summary_model,
            &mut assistant,
            &request.url,
        )
        .await?;
        Ok((StatusCode::CREATED, Json(document)).into_response())
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListDocumentsQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let assistant = owned_assistant(&resources, query.assistant_id, auth.user_id()).await?;
        let documents = resources.database.list_google_docs(assistant.id).await?;
        Ok((StatusCode::OK, Json(documents)).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(document_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let document_id = parse_id(&document_id, "document")?;
        let document = resources
            .database
            .get_google_doc(document_id)
            .await?
            .ok_or_else(|| AppError::not_found("Document"))?;
        validate_ownership(document.user_id, auth.user_id(), "Document")?;

        google_docs::remove_document(&resources.database, resources.openai.as_ref(), &document)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
