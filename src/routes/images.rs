// ABOUTME: Photo editor route handlers proxying image generation and editing
// ABOUTME: Generation takes JSON; edits take a multipart image with prompt and size fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::read_multipart;
use crate::errors::AppError;
use crate::middleware::authenticate;
use crate::resources::ServerResources;
use crate::services::photo_editor;
use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Generation request
#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    /// Image description
    pub prompt: String,
    /// One of the allowed sizes
    #[serde(default)]
    pub size: Option<String>,
}

/// Image routes
pub struct ImageRoutes;

impl ImageRoutes {
    /// Create all image routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/images/generate", post(Self::handle_generate))
            .route("/api/images/edit", post(Self::handle_edit))
            .with_state(resources)
    }

    async fn handle_generate(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<GenerateImageRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;
        let images = photo_editor::generate(
            resources.openai.as_ref(),
            &request.prompt,
            request.size.as_deref(),
        )
        .await?;
        Ok((StatusCode::OK, Json(json!({ "images": images }))).into_response())
    }

    async fn handle_edit(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        multipart: Multipart,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;
        let mut form =
            read_multipart(multipart, resources.config.storage.max_upload_bytes).await?;
        let image = form.take_file("image")?;
        let prompt = form.field("prompt").unwrap_or_default();

        let images = photo_editor::edit(
            resources.openai.as_ref(),
            image.bytes.to_vec(),
            &image.file_name,
            prompt,
            form.field("size"),
        )
        .await?;
        Ok((StatusCode::OK, Json(json!({ "images": images }))).into_response())
    }
}
