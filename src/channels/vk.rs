// ABOUTME: VK Callback API event parsing and messages.send client
// ABOUTME: Handles the confirmation handshake and optional callback secret check
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::InboundMessage;
use crate::errors::{AppError, AppResult};
use rand::Rng;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// VK API method root
pub const API_BASE_URL: &str = "https://api.vk.com/method";

/// VK API version sent with every call
pub const API_VERSION: &str = "5.199";

/// Body VK expects in reply to every accepted event
pub const ACK: &str = "ok";

/// A Callback API event relevant to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VkEvent {
    /// Server address confirmation request
    Confirmation,
    /// New incoming text message
    Message(InboundMessage),
    /// Anything else, acknowledged and dropped
    Ignored,
}

/// Classify a Callback API payload
#[must_use]
pub fn parse_event(payload: &Value) -> VkEvent {
    match payload.get("type").and_then(Value::as_str) {
        Some("confirmation") => VkEvent::Confirmation,
        Some("message_new") => parse_message(payload).map_or(VkEvent::Ignored, VkEvent::Message),
        _ => VkEvent::Ignored,
    }
}

fn parse_message(payload: &Value) -> Option<InboundMessage> {
    let object = payload.get("object")?;
    // API 5.103+ nests the message, older versions put it at the top level
    let message = object.get("message").unwrap_or(object);
    let text = message.get("text")?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    let peer_id = message
        .get("peer_id")
        .or_else(|| message.get("from_id"))?
        .as_i64()?;
    Some(InboundMessage {
        chat_id: peer_id.to_string(),
        text: text.to_owned(),
        sender_name: None,
    })
}

/// Check the payload `secret` when the integration configures one
#[must_use]
pub fn secret_matches(payload: &Value, expected: Option<&str>) -> bool {
    expected.is_none_or(|expected| {
        payload.get("secret").and_then(Value::as_str) == Some(expected)
    })
}

/// Send `text` to `peer_id`
///
/// # Errors
///
/// Returns an external service error when VK answers with an error object
pub async fn send_message(
    client: &Client,
    base_url: &str,
    access_token: &str,
    peer_id: &str,
    text: &str,
) -> AppResult<()> {
    let random_id = rand::thread_rng().gen_range(1..i32::MAX).to_string();
    let url = format!("{}/messages.send", base_url.trim_end_matches('/'));
    let response: Value = client
        .post(&url)
        .form(&[
            ("peer_id", peer_id),
            ("message", text),
            ("random_id", random_id.as_str()),
            ("access_token", access_token),
            ("v", API_VERSION),
        ])
        .send()
        .await?
        .json()
        .await?;

    if let Some(error) = response.get("error") {
        let message = error
            .get("error_msg")
            .and_then(Value::as_str)
            .unwrap_or("messages.send failed");
        return Err(AppError::external_service("VK", message.to_owned()));
    }
    debug!(peer_id, "Sent VK reply");
    Ok(())
}
