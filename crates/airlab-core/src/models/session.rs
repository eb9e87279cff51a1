// ABOUTME: Server-side login session referenced by signed session tokens
// ABOUTME: Deleting the row revokes every token issued for it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID (the `sid` claim)
    pub id: Uuid,
    /// Authenticated user
    pub user_id: Uuid,
    /// Client user agent at login
    pub user_agent: Option<String>,
    /// Hard expiry
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// New session for `user_id` valid for `ttl_hours`
    #[must_use]
    pub fn new(user_id: Uuid, ttl_hours: i64, user_agent: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            user_agent,
            expires_at: now + Duration::hours(ttl_hours),
            created_at: now,
        }
    }

    /// Whether the session is past its expiry at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
