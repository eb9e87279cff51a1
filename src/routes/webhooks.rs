// ABOUTME: Inbound messenger webhooks authenticated by a secret path segment per integration
// ABOUTME: Routes each text message through the assistant and replies via the channel client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! Messenger webhooks
//!
//! `POST /webhooks/:channel/:integration_id/:secret` accepts Telegram
//! updates, VK Callback API events and WhatsApp Cloud API notifications.
//! `GET` on the same path answers the WhatsApp subscription challenge.
//!
//! Processing failures are logged and acknowledged so messengers do not
//! redeliver the same update.

use super::parse_id;
use crate::channels::{telegram, vk, whatsapp, InboundMessage};
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Channel, Integration};
use crate::resources::ServerResources;
use crate::services::conversation;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

/// Path parameters of a webhook
type WebhookPath = Path<(String, String, String)>;

/// Webhook routes
pub struct WebhookRoutes;

impl WebhookRoutes {
    /// Create all webhook routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/webhooks/:channel/:integration_id/:secret",
                get(Self::handle_verify).post(Self::handle_event),
            )
            .with_state(resources)
    }

    /// Resolve the integration and check the path secret
    async fn authorize(
        resources: &ServerResources,
        channel: &str,
        integration_id: &str,
        secret: &str,
    ) -> AppResult<Integration> {
        let channel: Channel = channel.parse()?;
        let integration_id = parse_id(integration_id, "integration")?;
        let integration = resources
            .database
            .get_integration(integration_id)
            .await?
            .filter(|i| i.channel == channel)
            .ok_or_else(|| AppError::not_found("Integration"))?;

        let secret_ok: bool = secret
            .as_bytes()
            .ct_eq(integration.webhook_secret.as_bytes())
            .into();
        if !secret_ok {
            AppLogger::log_security_event(
                "webhook_secret_mismatch",
                "medium",
                &format!("integration {}", integration.id),
                None,
            );
            return Err(AppError::forbidden("Invalid webhook secret"));
        }
        Ok(integration)
    }

    /// WhatsApp subscription verification
    async fn handle_verify(
        State(resources): State<Arc<ServerResources>>,
        Path((channel, integration_id, secret)): WebhookPath,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Response, AppError> {
        let integration = Self::authorize(&resources, &channel, &integration_id, &secret).await?;
        if integration.channel != Channel::Whatsapp {
            return Err(AppError::invalid_input(
                "Subscription verification is only used by WhatsApp",
            ));
        }
        let expected = integration.config_str("verify_token").unwrap_or_default();
        whatsapp::verify_subscription(
            params.get("hub.mode").map(String::as_str),
            params.get("hub.verify_token").map(String::as_str),
            params.get("hub.challenge").map(String::as_str),
            expected,
        )
        .map(|challenge| (StatusCode::OK, challenge).into_response())
        .ok_or_else(|| AppError::forbidden("Verification token mismatch"))
    }

    async fn handle_event(
        State(resources): State<Arc<ServerResources>>,
        Path((channel, integration_id, secret)): WebhookPath,
        Json(payload): Json<Value>,
    ) -> Result<Response, AppError> {
        let integration = Self::authorize(&resources, &channel, &integration_id, &secret).await?;

        match integration.channel {
            Channel::Telegram => {
                let messages: Vec<InboundMessage> =
                    telegram::parse_update(&payload).into_iter().collect();
                Self::dispatch(&resources, &integration, messages).await;
                Ok((StatusCode::OK, Json(json!({ "ok": true }))).into_response())
            }
            Channel::Vk => {
                if !vk::secret_matches(&payload, integration.config_str("secret_key")) {
                    return Err(AppError::forbidden("Invalid VK secret"));
                }
                match vk::parse_event(&payload) {
                    vk::VkEvent::Confirmation => {
                        let code = integration
                            .config_str("confirmation_code")
                            .unwrap_or_default()
                            .to_owned();
                        Ok((StatusCode::OK, code).into_response())
                    }
                    vk::VkEvent::Message(message) => {
                        Self::dispatch(&resources, &integration, vec![message]).await;
                        Ok((StatusCode::OK, vk::ACK).into_response())
                    }
                    vk::VkEvent::Ignored => Ok((StatusCode::OK, vk::ACK).into_response()),
                }
            }
            Channel::Whatsapp => {
                let messages = whatsapp::parse_messages(&payload);
                Self::dispatch(&resources, &integration, messages).await;
                Ok((StatusCode::OK, Json(json!({ "status": "received" }))).into_response())
            }
            Channel::Web | Channel::Widget => Err(AppError::invalid_input(
                "Channel does not accept webhooks",
            )),
        }
    }

    /// Answer each inbound message, logging failures
    async fn dispatch(
        resources: &ServerResources,
        integration: &Integration,
        messages: Vec<InboundMessage>,
    ) {
        if messages.is_empty() {
            debug!(integration_id = %integration.id, "Webhook carried no text messages");
            return;
        }
        if !integration.is_active {
            debug!(integration_id = %integration.id, "Ignoring traffic for inactive integration");
            return;
        }

        for message in messages {
            let outcome = Self::answer(resources, integration, &message).await;
            let success = outcome.is_ok();
            if let Err(e) = outcome {
                warn!(
                    integration_id = %integration.id,
                    chat_id = %message.chat_id,
                    "Failed to answer channel message: {e}"
                );
            }
            AppLogger::log_channel_event(
                integration.channel.as_str(),
                &integration.id.to_string(),
                "message",
                success,
            );
        }
    }

    async fn answer(
        resources: &ServerResources,
        integration: &Integration,
        message: &InboundMessage,
    ) -> AppResult<()> {
        let assistant = resources
            .database
            .get_assistant(integration.assistant_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or_else(|| AppError::not_found("Assistant"))?;

        let conversation = conversation::find_or_start_conversation(
            &resources.database,
            resources.openai.as_ref(),
            &assistant,
            integration.channel,
            &message.chat_id,
            message.sender_name.clone(),
        )
        .await?;
        let outcome = conversation::reply(
            &resources.database,
            resources.openai.as_ref(),
            resources.config.run_poll,
            conversation,
            &assistant,
            &message.text,
        )
        .await?;

        resources
            .channels
            .send_text(
                integration,
                &message.chat_id,
                &outcome.assistant_message.content,
            )
            .await
    }
}
