// ABOUTME: Messaging integration model (Telegram, VK, WhatsApp) attached to an assistant
// ABOUTME: Channel credentials live in a JSON config column and are redacted for display
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::Channel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Config keys holding credentials
const SECRET_KEYS: &[&str] = &["bot_token", "access_token", "verify_token", "secret_key"];

/// Messenger integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integration {
    /// Local ID
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Assistant answering the channel
    pub assistant_id: Uuid,
    /// Messenger
    pub channel: Channel,
    /// Display name
    pub name: String,
    /// Channel credentials and options
    pub config: Value,
    /// Secret path segment authenticating inbound webhooks
    pub webhook_secret: String,
    /// Disabled integrations ignore inbound traffic
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Integration {
    /// String value of a config key
    #[must_use]
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config
            .get(key)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Config with credential values masked
    #[must_use]
    pub fn redacted_config(&self) -> Value {
        let mut config = self.config.clone();
        if let Some(map) = config.as_object_mut() {
            for key in SECRET_KEYS {
                if let Some(value) = map.get_mut(*key) {
                    let masked = value
                        .as_str()
                        .map(|s| {
                            let tail: String = s.chars().rev().take(4).collect();
                            format!("****{}", tail.chars().rev().collect::<String>())
                        })
                        .unwrap_or_else(|| "****".to_owned());
                    *value = Value::String(masked);
                }
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redacted_config_masks_tokens() {
        let now = Utc::now();
        let integration = Integration {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            assistant_id: Uuid::new_v4(),
            channel: Channel::Telegram,
            name: "bot".into(),
            config: json!({"bot_token": "123456:ABCDEF", "greeting": "hi"}),
            webhook_secret: "s".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let redacted = integration.redacted_config();
        assert_eq!(redacted["bot_token"], "****CDEF");
        assert_eq!(redacted["greeting"], "hi");
    }
}
