// ABOUTME: Assistant route handlers for CRUD, business analysis and the widget designer
// ABOUTME: All handlers are scoped to the authenticated owner; foreign ids answer 404
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! Assistant routes
//!
//! Creation and updates are mirrored to `OpenAI` through
//! [`crate::services::assistants`]; deletion cleans up remotely on a
//! best-effort basis.

use super::{owned_assistant, parse_id};
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::middleware::authenticate;
use crate::resources::ServerResources;
use crate::services::{
    analyzer,
    assistants::{self, CreateAssistantRequest, UpdateAssistantRequest},
    widget::{render_widget_html, WidgetSettings},
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Analyzer input
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Free-form business description
    pub text: String,
}

/// Generated widget snippet
#[derive(Debug, Serialize)]
pub struct WidgetResponse {
    /// Standalone HTML+JS snippet
    pub html: String,
    /// Settings the snippet was rendered with
    pub settings: WidgetSettings,
}

/// Assistant routes
pub struct AssistantRoutes;

impl AssistantRoutes {
    /// Create all assistant routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/assistants",
                post(Self::handle_create).get(Self::handle_list),
            )
            .route("/api/assistants/analyze", post(Self::handle_analyze))
            .route(
                "/api/assistants/:assistant_id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/api/assistants/:assistant_id/widget",
                post(Self::handle_widget),
            )
            .with_state(resources)
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateAssistantRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let assistant = assistants::create_assistant(
            &resources.database,
            resources.openai.as_ref(),
            auth.user_id(),
            &resources.config.openai.default_model,
            request,
        )
        .await?;
        Ok((StatusCode::CREATED, Json(assistant)).into_response())
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let assistants = resources
            .database
            .list_assistants_for_user(auth.user_id())
            .await?;
        Ok((StatusCode::OK, Json(assistants)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(assistant_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let assistant_id = parse_id(&assistant_id, "assistant")?;
        let assistant = owned_assistant(&resources, assistant_id, auth.user_id()).await?;
        Ok((StatusCode::OK, Json(assistant)).into_response())
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(assistant_id): Path<String>,
        Json(request): Json<UpdateAssistantRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let assistant_id = parse_id(&assistant_id, "assistant")?;
        let assistant = owned_assistant(&resources, assistant_id, auth.user_id()).await?;
        let updated = assistants::update_assistant(
            &resources.database,
            resources.openai.as_ref(),
            assistant,
            request,
        )
        .await?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(assistant_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let assistant_id = parse_id(&assistant_id, "assistant")?;
        let assistant = owned_assistant(&resources, assistant_id, auth.user_id()).await?;
        assistants::delete_assistant(
            &resources.database,
            resources.openai.as_ref(),
            resources.storage.as_ref(),
            &assistant,
        )
        .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_analyze(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<AnalyzeRequest>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;
        let analysis = analyzer::analyze(
            resources.openai.as_ref(),
            &resources.config.openai.default_model,
            &request.text,
        )
        .await?;
        Ok((StatusCode::OK, Json(analysis)).into_response())
    }

    /// Render the widget snippet and remember the settings on the assistant
    async fn handle_widget(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(assistant_id): Path<String>,
        Json(settings): Json<WidgetSettings>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let assistant_id = parse_id(&assistant_id, "assistant")?;
        let mut assistant = owned_assistant(&resources, assistant_id, auth.user_id()).await?;

        let html = render_widget_html(
            assistant.id,
            &resources.config.public_base_url,
            &settings,
        )?;

        if !assistant.settings.is_object() {
            assistant.settings = Value::Object(serde_json::Map::new());
        }
        if let Some(map) = assistant.settings.as_object_mut() {
            map.insert("widget".to_owned(), serde_json::to_value(&settings)?);
        }
        assistant.updated_at = Utc::now();
        resources.database.update_assistant(&assistant).await?;

        Ok((StatusCode::OK, Json(WidgetResponse { html, settings })).into_response())
    }
}
