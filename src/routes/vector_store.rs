// ABOUTME: Vector store route handlers passing authenticated requests through to OpenAI
// ABOUTME: Create and delete stores and manage the files attached to them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::errors::{AppError, AppResult};
use crate::middleware::authenticate;
use crate::resources::ServerResources;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Store creation request
#[derive(Debug, Deserialize)]
pub struct CreateVectorStoreRequest {
    /// Store name
    pub name: String,
}

/// File attach request
#[derive(Debug, Deserialize)]
pub struct AddFileRequest {
    /// Previously uploaded `OpenAI` file
    pub file_id: String,
}

/// Upstream ids are interpolated into URLs
fn upstream_id<'a>(value: &'a str, entity: &str) -> AppResult<&'a str> {
    let valid = !value.is_empty()
        && value.len() <= 128
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(value)
    } else {
        Err(AppError::invalid_input(format!("Invalid {entity} id")))
    }
}

/// Vector store routes
pub struct VectorStoreRoutes;

impl VectorStoreRoutes {
    /// Create all vector store routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/vector-store", post(Self::handle_create))
            .route("/api/vector-store/:store_id", delete(Self::handle_delete))
            .route(
                "/api/vector-store/:store_id/files",
                get(Self::handle_list_files).post(Self::handle_add_file),
            )
            .route(
                "/api/vector-store/:store_id/files/:file_id",
                delete(Self::handle_remove_file),
            )
            .with_state(resources)
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateVectorStoreRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_input("Vector store name is required"));
        }
        let store = resources.openai.create_vector_store(name).await?;
        Ok((StatusCode::CREATED, Json(store)).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(store_id): Path<String>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;
        resources
            .openai
            .delete_vector_store(upstream_id(&store_id, "vector store")?)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_list_files(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(store_id): Path<String>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;
        let files = resources
            .openai
            .list_vector_store_files(upstream_id(&store_id, "vector store")?)
            .await?;
        Ok((StatusCode::OK, Json(json!({ "files": files }))).into_response())
    }

    async fn handle_add_file(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(store_id): Path<String>,
        Json(request): Json<AddFileRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;
        let file = resources
            .openai
            .add_vector_store_file(
                upstream_id(&store_id, "vector store")?,
                upstream_id(&request.file_id, "file")?,
            )
            .await?;
        Ok((StatusCode::CREATED, Json(file)).into_response())
    }

    async fn handle_remove_file(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((store_id, file_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;
        resources
            .openai
            .remove_vector_store_file(
                upstream_id(&store_id, "vector store")?,
                upstream_id(&file_id, "file")?,
            )
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
