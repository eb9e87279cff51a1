// ABOUTME: Conversation model binding a channel chat to an OpenAI thread
// ABOUTME: Message history is kept as a JSON array of role/content pairs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Surface a conversation arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Dashboard chat
    Web,
    /// Embedded website widget
    Widget,
    /// Telegram bot
    Telegram,
    /// VK community bot
    Vk,
    /// `WhatsApp` Cloud API
    Whatsapp,
}

string_enum!(Channel {
    Web => "web",
    Widget => "widget",
    Telegram => "telegram",
    Vk => "vk",
    Whatsapp => "whatsapp",
});

impl Channel {
    /// Whether this channel is backed by an external messenger integration
    #[must_use]
    pub const fn is_messenger(self) -> bool {
        matches!(self, Self::Telegram | Self::Vk | Self::Whatsapp)
    }
}

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// End user
    User,
    /// Assistant reply
    Assistant,
}

string_enum!(MessageRole { User => "user", Assistant => "assistant" });

/// One entry of the stored history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Author
    pub role: MessageRole,
    /// Text content
    pub content: String,
    /// When the message was recorded
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    /// Message from the end user, timestamped now
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Message from the assistant, timestamped now
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Conversation between an end user and an assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Local ID
    pub id: Uuid,
    /// Assistant answering the conversation
    pub assistant_id: Uuid,
    /// Tenant that owns the assistant
    pub user_id: Uuid,
    /// `OpenAI` thread ID
    pub thread_id: Option<String>,
    /// Surface
    pub channel: Channel,
    /// Chat identifier on the external channel (Telegram chat id, widget session...)
    pub external_chat_id: Option<String>,
    /// Title
    pub title: String,
    /// Stored history
    pub messages: Vec<StoredMessage>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}
