// ABOUTME: Messenger integration route handlers for Telegram, VK and WhatsApp connections
// ABOUTME: Responses redact credentials and expose the webhook URL to register with the messenger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::{owned_assistant, parse_id};
use crate::channels::validate_config;
use crate::database_plugins::shared::validation::validate_ownership;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::middleware::authenticate;
use crate::models::{Channel, Integration};
use crate::resources::ServerResources;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Prefix of masked credential values echoed back by clients
const MASK_PREFIX: &str = "****";

/// Integration creation request
#[derive(Debug, Deserialize)]
pub struct CreateIntegrationRequest {
    /// Assistant answering the channel
    pub assistant_id: Uuid,
    /// Messenger
    pub channel: Channel,
    /// Display name
    pub name: String,
    /// Channel credentials
    pub config: Value,
}

/// Partial integration update
#[derive(Debug, Default, Deserialize)]
pub struct UpdateIntegrationRequest {
    /// Reassign to another own assistant
    pub assistant_id: Option<Uuid>,
    /// Display name
    pub name: Option<String>,
    /// Replacement config; masked values keep the stored secret
    pub config: Option<Value>,
    /// Enable or disable inbound handling
    pub is_active: Option<bool>,
}

/// Integration as shown to its owner
#[derive(Debug, Serialize)]
pub struct IntegrationResponse {
    /// Local ID
    pub id: Uuid,
    /// Assistant answering the channel
    pub assistant_id: Uuid,
    /// Messenger
    pub channel: Channel,
    /// Display name
    pub name: String,
    /// Config with credentials masked
    pub config: Value,
    /// Whether inbound traffic is handled
    pub is_active: bool,
    /// URL to register with the messenger
    pub webhook_url: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl IntegrationResponse {
    fn new(integration: &Integration, public_base_url: &str) -> Self {
        Self {
            id: integration.id,
            assistant_id: integration.assistant_id,
            channel: integration.channel,
            name: integration.name.clone(),
            config: integration.redacted_config(),
            is_active: integration.is_active,
            webhook_url: format!(
                "{}/webhooks/{}/{}/{}",
                public_base_url.trim_end_matches('/'),
                integration.channel,
                integration.id,
                integration.webhook_secret
            ),
            created_at: integration.created_at,
            updated_at: integration.updated_at,
        }
    }
}

/// Random path secret for inbound webhooks
fn generate_webhook_secret() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Keep stored secrets where the client sent back a masked value
fn merge_config(stored: &Value, mut incoming: Value) -> Value {
    if let (Some(stored), Some(map)) = (stored.as_object(), incoming.as_object_mut()) {
        for (key, value) in map.iter_mut() {
            let masked = value.as_str().is_some_and(|s| s.starts_with(MASK_PREFIX));
            if masked {
                if let Some(original) = stored.get(key) {
                    value.clone_from(original);
                }
            }
        }
    }
    incoming
}

/// Integration routes
pub struct IntegrationRoutes;

impl IntegrationRoutes {
    /// Create all integration routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/integrations",
                post(Self::handle_create).get(Self::handle_list),
            )
            .route(
                "/api/integrations/:integration_id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    async fn owned_integration(
        resources: &ServerResources,
        integration_id: &str,
        user_id: Uuid,
    ) -> AppResult<Integration> {
        let integration_id = parse_id(integration_id, "integration")?;
        let integration = resources
            .database
            .get_integration(integration_id)
            .await?
            .ok_or_else(|| AppError::not_found("Integration"))?;
        validate_ownership(integration.user_id, user_id, "Integration")?;
        Ok(integration)
    }

    fn respond(
        resources: &ServerResources,
        integration: &Integration,
        status: StatusCode,
    ) -> Response {
        let body = IntegrationResponse::new(integration, &resources.config.public_base_url);
        (status, Json(body)).into_response()
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateIntegrationRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let assistant = owned_assistant(&resources, request.assistant_id, auth.user_id()).await?;
        validate_config(request.channel, &request.config)?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_input("Integration name is required"));
        }

        let now = Utc::now();
        let integration = Integration {
            id: Uuid::new_v4(),
            user_id: auth.user_id(),
            assistant_id: assistant.id,
            channel: request.channel,
            name: name.to_owned(),
            config: request.config,
            webhook_secret: generate_webhook_secret(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        resources.database.create_integration(&integration).await?;
        info!(
            integration_id = %integration.id,
            channel = integration.channel.as_str(),
            "Created integration"
        );
        Ok(Self::respond(&resources, &integration, StatusCode::CREATED))
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let integrations = resources
            .database
            .list_integrations_for_user(auth.user_id())
            .await?;
        let body: Vec<IntegrationResponse> = integrations
            .iter()
            .map(|i| IntegrationResponse::new(i, &resources.config.public_base_url))
            .collect();
        Ok((StatusCode::OK, Json(body)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(integration_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let integration =
            Self::owned_integration(&resources, &integration_id, auth.user_id()).await?;
        Ok(Self::respond(&resources, &integration, StatusCode::OK))
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(integration_id): Path<String>,
        Json(request): Json<UpdateIntegrationRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut integration =
            Self::owned_integration(&resources, &integration_id, auth.user_id()).await?;

        if let Some(assistant_id) = request.assistant_id {
            integration.assistant_id = owned_assistant(&resources, assistant_id, auth.user_id())
                .await?
                .id;
        }
        if let Some(name) = request.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::invalid_input("Integration name is required"));
            }
            name.clone_into(&mut integration.name);
        }
        if let Some(config) = request.config {
            let merged = merge_config(&integration.config, config);
            validate_config(integration.channel, &merged)?;
            integration.config = merged;
        }
        if let Some(is_active) = request.is_active {
            integration.is_active = is_active;
        }
        integration.updated_at = Utc::now();
        resources.database.update_integration(&integration).await?;
        Ok(Self::respond(&resources, &integration, StatusCode::OK))
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(integration_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let integration =
            Self::owned_integration(&resources, &integration_id, auth.user_id()).await?;
        resources
            .database
            .delete_integration(integration.id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_masked_values_keep_stored_secret() {
        let stored = json!({"bot_token": "123:SECRET", "greeting": "hi"});
        let merged = merge_config(&stored, json!({"bot_token": "****CRET", "greeting": "hello"}));
        assert_eq!(merged["bot_token"], "123:SECRET");
        assert_eq!(merged["greeting"], "hello");
    }

    #[test]
    fn test_webhook_secret_is_hex() {
        let secret = generate_webhook_secret();
        assert_eq!(secret.len(), 48);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
