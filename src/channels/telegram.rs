// ABOUTME: Telegram Bot API webhook parsing and sendMessage client
// ABOUTME: Long replies are split to respect Telegram's 4096 UTF-16 unit limit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::{split_message_by, InboundMessage};
use crate::errors::{AppError, AppResult};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Telegram Bot API root
pub const API_BASE_URL: &str = "https://api.telegram.org";

/// Longest text accepted by `sendMessage`, in UTF-16 code units
const MAX_MESSAGE_UTF16_UNITS: usize = 4096;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Extract the text of a new message, ignoring edits and everything else
#[must_use]
pub fn parse_update(update: &Value) -> Option<InboundMessage> {
    let message = update.get("message")?;
    let text = message.get("text")?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    let chat_id = match message.get("chat")?.get("id")? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => return None,
    };
    let sender_name = message
        .get("from")
        .and_then(|from| from.get("first_name"))
        .and_then(Value::as_str)
        .map(str::to_owned);

    Some(InboundMessage {
        chat_id,
        text: text.to_owned(),
        sender_name,
    })
}

/// Send `text` to `chat_id`
///
/// # Errors
///
/// Returns an external service error when Telegram rejects the message
pub async fn send_message(
    client: &Client,
    base_url: &str,
    bot_token: &str,
    chat_id: &str,
    text: &str,
) -> AppResult<()> {
    let url = format!("{}/bot{bot_token}/sendMessage", base_url.trim_end_matches('/'));
    for chunk in split_message_by(text, MAX_MESSAGE_UTF16_UNITS, char::len_utf16) {
        let response: ApiResponse = client
            .post(&url)
            .json(&json!({ "chat_id": chat_id, "text": chunk }))
            .send()
            .await?
            .json()
            .await?;
        if !response.ok {
            return Err(AppError::external_service(
                "Telegram",
                response
                    .description
                    .unwrap_or_else(|| "sendMessage failed".to_owned()),
            ));
        }
    }
    debug!(chat_id, "Sent Telegram reply");
    Ok(())
}
