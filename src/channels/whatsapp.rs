// ABOUTME: WhatsApp Cloud API webhook parsing, subscription verification, and message sending
// ABOUTME: Only text messages are answered; statuses and media are acknowledged and dropped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::{split_message, InboundMessage};
use crate::errors::{AppError, AppResult};
use reqwest::Client;
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use tracing::debug;

/// Meta Graph API root
pub const API_BASE_URL: &str = "https://graph.facebook.com/v19.0";

/// Longest text body accepted by the Cloud API
const MAX_MESSAGE_CHARS: usize = 4096;

/// Answer the `hub.challenge` of a subscription request when the token matches
#[must_use]
pub fn verify_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    expected_token: &str,
) -> Option<String> {
    let token = token?;
    let token_ok: bool = token.as_bytes().ct_eq(expected_token.as_bytes()).into();
    (mode == Some("subscribe") && token_ok)
        .then(|| challenge.map(str::to_owned))
        .flatten()
}

/// Collect the text messages of a webhook notification
#[must_use]
pub fn parse_messages(payload: &Value) -> Vec<InboundMessage> {
    let mut inbound = Vec::new();
    let entries = payload.get("entry").and_then(Value::as_array);
    for entry in entries.into_iter().flatten() {
        let changes = entry.get("changes").and_then(Value::as_array);
        for change in changes.into_iter().flatten() {
            let Some(value) = change.get("value") else {
                continue;
            };
            let contact_name = value
                .get("contacts")
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("profile"))
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str);
            let messages = value.get("messages").and_then(Value::as_array);
            for message in messages.into_iter().flatten() {
                if message.get("type").and_then(Value::as_str) != Some("text") {
                    continue;
                }
                let from = message.get("from").and_then(Value::as_str);
                let body = message
                    .get("text")
                    .and_then(|t| t.get("body"))
                    .and_then(Value::as_str)
                    .map(str::trim);
                if let (Some(from), Some(body)) = (from, body) {
                    if !body.is_empty() {
                        inbound.push(InboundMessage {
                            chat_id: from.to_owned(),
                            text: body.to_owned(),
                            sender_name: contact_name.map(str::to_owned),
                        });
                    }
                }
            }
        }
    }
    inbound
}

/// Send `text` to the phone number `to`
///
/// # Errors
///
/// Returns an external service error when the Graph API rejects the message
pub async fn send_message(
    client: &Client,
    base_url: &str,
    access_token: &str,
    phone_number_id: &str,
    to: &str,
    text: &str,
) -> AppResult<()> {
    let url = format!("{}/{phone_number_id}/messages", base_url.trim_end_matches('/'));
    for chunk in split_message(text, MAX_MESSAGE_CHARS) {
        let response = client
            .post(&url)
            .bearer_auth(access_token)
            .json(&json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": to,
                "type": "text",
                "text": { "preview_url": false, "body": chunk }
            }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map_or_else(|| format!("send failed with {status}"), str::to_owned);
            return Err(AppError::external_service("WhatsApp", message));
        }
    }
    debug!(to, "Sent WhatsApp reply");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_subscription() {
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("tok"), Some("123"), "tok").as_deref(),
            Some("123")
        );
        assert!(verify_subscription(Some("subscribe"), Some("bad"), Some("123"), "tok").is_none());
        assert!(verify_subscription(None, Some("tok"), Some("123"), "tok").is_none());
    }

    #[test]
    fn test_parse_messages_keeps_text_only() {
        let payload = json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "value": {
                        "contacts": [{"profile": {"name": "Ivan"}, "wa_id": "79990001122"}],
                        "messages": [
                            {"from": "79990001122", "type": "text", "text": {"body": "Price?"}},
                            {"from": "79990001122", "type": "image", "image": {}}
                        ]
                    }
                }]
            }]
        });
        let messages = parse_messages(&payload);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].chat_id, "79990001122");
        assert_eq!(messages[0].text, "Price?");
        assert_eq!(messages[0].sender_name.as_deref(), Some("Ivan"));
        assert!(parse_messages(&json!({"entry": [{"changes": [{"value": {"statuses": []}}]}]})).is_empty());
    }
}
