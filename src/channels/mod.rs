// ABOUTME: Messenger channel plumbing for Telegram, VK, and WhatsApp integrations
// ABOUTME: Parses inbound webhook payloads and sends replies through the ChannelClient trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! # Messenger Channels
//!
//! Each channel module knows its webhook payload shape and its send API.
//! [`HttpChannelClient`] dispatches on the integration's channel; tests
//! substitute their own [`ChannelClient`].

use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use crate::models::{Channel, Integration};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Telegram Bot API
pub mod telegram;
/// VK Callback and Messages API
pub mod vk;
/// WhatsApp Cloud API
pub mod whatsapp;

/// A text message received from a messenger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Chat to answer in
    pub chat_id: String,
    /// Message text
    pub text: String,
    /// Sender display name, when the payload carries one
    pub sender_name: Option<String>,
}

/// Sends replies to messenger chats
#[async_trait]
pub trait ChannelClient: Send + Sync {
    /// Send `text` to `chat_id` using the integration's credentials
    async fn send_text(&self, integration: &Integration, chat_id: &str, text: &str)
        -> AppResult<()>;
}

/// Base URLs of the messenger APIs
#[derive(Debug, Clone)]
pub struct ChannelEndpoints {
    /// Telegram Bot API root
    pub telegram: String,
    /// VK API method root
    pub vk: String,
    /// Meta Graph API root
    pub whatsapp: String,
}

impl Default for ChannelEndpoints {
    fn default() -> Self {
        Self {
            telegram: telegram::API_BASE_URL.to_owned(),
            vk: vk::API_BASE_URL.to_owned(),
            whatsapp: whatsapp::API_BASE_URL.to_owned(),
        }
    }
}

/// reqwest-backed sender for all messenger channels
#[derive(Clone)]
pub struct HttpChannelClient {
    client: Client,
    endpoints: ChannelEndpoints,
}

impl HttpChannelClient {
    /// Create a client against the given endpoints
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(endpoints: ChannelEndpoints) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(limits::UPSTREAM_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, endpoints })
    }
}

#[async_trait]
impl ChannelClient for HttpChannelClient {
    async fn send_text(
        &self,
        integration: &Integration,
        chat_id: &str,
        text: &str,
    ) -> AppResult<()> {
        match integration.channel {
            Channel::Telegram => {
                telegram::send_message(
                    &self.client,
                    &self.endpoints.telegram,
                    required(integration, "bot_token")?,
                    chat_id,
                    text,
                )
                .await
            }
            Channel::Vk => {
                vk::send_message(
                    &self.client,
                    &self.endpoints.vk,
                    required(integration, "access_token")?,
                    chat_id,
                    text,
                )
                .await
            }
            Channel::Whatsapp => {
                whatsapp::send_message(
                    &self.client,
                    &self.endpoints.whatsapp,
                    required(integration, "access_token")?,
                    required(integration, "phone_number_id")?,
                    chat_id,
                    text,
                )
                .await
            }
            Channel::Web | Channel::Widget => Err(AppError::invalid_input(format!(
                "Channel {} has no outbound API",
                integration.channel
            ))),
        }
    }
}

fn required<'a>(integration: &'a Integration, key: &str) -> AppResult<&'a str> {
    integration
        .config_str(key)
        .ok_or_else(|| AppError::config(format!("Integration is missing '{key}'")))
}

/// Config keys an integration on `channel` must provide
#[must_use]
pub const fn required_config_keys(channel: Channel) -> &'static [&'static str] {
    match channel {
        Channel::Telegram => &["bot_token"],
        Channel::Vk => &["access_token", "confirmation_code"],
        Channel::Whatsapp => &["access_token", "phone_number_id", "verify_token"],
        Channel::Web | Channel::Widget => &[],
    }
}

/// Check that `config` is an object carrying the channel's required keys
///
/// # Errors
///
/// Returns `INVALID_INPUT` for non-messenger channels, non-object configs and
/// missing or blank keys
pub fn validate_config(channel: Channel, config: &Value) -> AppResult<()> {
    if !channel.is_messenger() {
        return Err(AppError::invalid_input(format!(
            "Integrations are not available for the {channel} channel"
        )));
    }
    let map = config
        .as_object()
        .ok_or_else(|| AppError::invalid_input("config must be a JSON object"))?;
    for key in required_config_keys(channel) {
        let present = map
            .get(*key)
            .and_then(Value::as_str)
            .is_some_and(|v| !v.trim().is_empty());
        if !present {
            return Err(AppError::invalid_input(format!(
                "{channel} integrations require '{key}' in config"
            )));
        }
    }
    Ok(())
}

/// Split a reply into chunks of at most `max_chars` characters
#[must_use]
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    split_message_by(text, max_chars, |_| 1)
}

/// Split a reply into chunks whose summed `width` stays within `max_units`
///
/// Characters are never divided across chunks.
#[must_use]
pub fn split_message_by(
    text: &str,
    max_units: usize,
    width: impl Fn(char) -> usize,
) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut units = 0;
    for c in text.chars() {
        let w = width(c);
        if units + w > max_units && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            units = 0;
        }
        current.push(c);
        units += w;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
