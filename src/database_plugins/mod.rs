// ABOUTME: Database abstraction layer for the Air Lab assistant builder
// ABOUTME: Plugin architecture for database support with SQLite and PostgreSQL backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::errors::AppResult;
use crate::models::{
    Assistant, BillingPlan, Channel, Conversation, GoogleDocsDocument, Integration,
    KnowledgeBaseEntry, Session, User, UserRole,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod factory;
pub mod sqlite;

#[cfg(feature = "postgresql")]
pub mod postgres;

/// Shared row mappers and validation
pub mod shared;

/// Core database abstraction trait
///
/// All database implementations must implement this trait to provide
/// a consistent interface for the application layer.
#[async_trait]
pub trait DatabaseProvider: Send + Sync + Clone {
    /// Create a new database connection and run migrations
    async fn new(database_url: &str) -> AppResult<Self>
    where
        Self: Sized;

    /// Run database migrations to set up schema
    async fn migrate(&self) -> AppResult<()>;

    /// Connectivity check used by the health endpoint
    async fn ping(&self) -> AppResult<()>;

    // ================================
    // User Management
    // ================================

    /// Create a new user account
    async fn create_user(&self, user: &User) -> AppResult<Uuid>;

    /// Get user by ID
    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>>;

    /// Get user by email address (case-insensitive)
    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List users, newest first
    async fn list_users(&self, limit: i64, offset: i64) -> AppResult<Vec<User>>;

    /// Update display name and/or password hash
    async fn update_user_profile(
        &self,
        user_id: Uuid,
        display_name: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<()>;

    /// Update role and active flag
    async fn update_user_status(&self, user_id: Uuid, role: UserRole, is_active: bool)
        -> AppResult<()>;

    /// Switch plan, debiting `price_cents` from the balance atomically
    ///
    /// Returns `false` without changing anything when the balance is too low.
    async fn change_user_plan(
        &self,
        user_id: Uuid,
        plan: BillingPlan,
        price_cents: i64,
    ) -> AppResult<bool>;

    /// Set plan without charging (admin override)
    async fn set_user_plan(&self, user_id: Uuid, plan: BillingPlan) -> AppResult<()>;

    /// Add `delta_cents` to the balance, clamping at zero; returns the new balance
    async fn adjust_user_balance(&self, user_id: Uuid, delta_cents: i64) -> AppResult<i64>;

    /// Count one consumed message
    async fn increment_messages_used(&self, user_id: Uuid) -> AppResult<()>;

    /// Start a new billing period
    async fn reset_messages_used(&self, user_id: Uuid) -> AppResult<()>;

    /// Start a new billing period at `period_start` if the stored one is older
    ///
    /// Resets `messages_used` in the same statement. Returns `false` when the
    /// period was already current, so only one caller sees the rollover.
    async fn roll_usage_period(&self, user_id: Uuid, period_start: DateTime<Utc>)
        -> AppResult<bool>;

    /// Update user's last active timestamp
    async fn update_last_active(&self, user_id: Uuid) -> AppResult<()>;

    /// Delete a user and everything it owns
    async fn delete_user(&self, user_id: Uuid) -> AppResult<bool>;

    /// Get total number of users
    async fn get_user_count(&self) -> AppResult<i64>;

    // ================================
    // Sessions
    // ================================

    /// Persist a login session
    async fn create_session(&self, session: &Session) -> AppResult<()>;

    /// Get session by ID
    async fn get_session(&self, session_id: Uuid) -> AppResult<Option<Session>>;

    /// Delete a session (logout)
    async fn delete_session(&self, session_id: Uuid) -> AppResult<bool>;

    /// Delete all sessions of a user
    async fn delete_user_sessions(&self, user_id: Uuid) -> AppResult<u64>;

    /// Delete sessions expired at `now`
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> AppResult<u64>;

    // ================================
    // Assistants
    // ================================

    /// Create an assistant record
    async fn create_assistant(&self, assistant: &Assistant) -> AppResult<Uuid>;

    /// Get assistant by ID
    async fn get_assistant(&self, assistant_id: Uuid) -> AppResult<Option<Assistant>>;

    /// List assistants owned by a user, newest first
    async fn list_assistants_for_user(&self, user_id: Uuid) -> AppResult<Vec<Assistant>>;

    /// List every assistant (admin)
    async fn list_all_assistants(&self, limit: i64, offset: i64) -> AppResult<Vec<Assistant>>;

    /// Persist all mutable assistant fields
    async fn update_assistant(&self, assistant: &Assistant) -> AppResult<()>;

    /// Delete an assistant and its dependent rows
    async fn delete_assistant(&self, assistant_id: Uuid) -> AppResult<bool>;

    /// Get total number of assistants
    async fn get_assistant_count(&self) -> AppResult<i64>;

    // ================================
    // Conversations
    // ================================

    /// Create a conversation
    async fn create_conversation(&self, conversation: &Conversation) -> AppResult<Uuid>;

    /// Get conversation by ID
    async fn get_conversation(&self, conversation_id: Uuid) -> AppResult<Option<Conversation>>;

    /// Find the conversation of an external chat on a channel
    async fn find_conversation_by_external(
        &self,
        assistant_id: Uuid,
        channel: Channel,
        external_chat_id: &str,
    ) -> AppResult<Option<Conversation>>;

    /// List conversations of a user, optionally for one assistant
    async fn list_conversations(
        &self,
        user_id: Uuid,
        assistant_id: Option<Uuid>,
    ) -> AppResult<Vec<Conversation>>;

    /// Persist thread, title and message history
    async fn update_conversation(&self, conversation: &Conversation) -> AppResult<()>;

    /// Delete a conversation
    async fn delete_conversation(&self, conversation_id: Uuid) -> AppResult<bool>;

    /// Get total number of conversations
    async fn get_conversation_count(&self) -> AppResult<i64>;

    // ================================
    // Google Docs
    // ================================

    /// Record an imported document
    async fn create_google_doc(&self, document: &GoogleDocsDocument) -> AppResult<Uuid>;

    /// Get document by ID
    async fn get_google_doc(&self, document_id: Uuid) -> AppResult<Option<GoogleDocsDocument>>;

    /// List documents imported for an assistant
    async fn list_google_docs(&self, assistant_id: Uuid) -> AppResult<Vec<GoogleDocsDocument>>;

    /// Persist summary, upstream ids, status and error
    async fn update_google_doc(&self, document: &GoogleDocsDocument) -> AppResult<()>;

    /// Delete a document record
    async fn delete_google_doc(&self, document_id: Uuid) -> AppResult<bool>;

    // ================================
    // Integrations
    // ================================

    /// Create a messenger integration
    async fn create_integration(&self, integration: &Integration) -> AppResult<Uuid>;

    /// Get integration by ID
    async fn get_integration(&self, integration_id: Uuid) -> AppResult<Option<Integration>>;

    /// List integrations of a user
    async fn list_integrations_for_user(&self, user_id: Uuid) -> AppResult<Vec<Integration>>;

    /// List integrations attached to an assistant
    async fn list_integrations_for_assistant(
        &self,
        assistant_id: Uuid,
    ) -> AppResult<Vec<Integration>>;

    /// Persist name, config and active flag
    async fn update_integration(&self, integration: &Integration) -> AppResult<()>;

    /// Delete an integration
    async fn delete_integration(&self, integration_id: Uuid) -> AppResult<bool>;

    // ================================
    // Knowledge Base
    // ================================

    /// Record an uploaded knowledge-base file
    async fn create_kb_entry(&self, entry: &KnowledgeBaseEntry) -> AppResult<Uuid>;

    /// Get knowledge-base entry by ID
    async fn get_kb_entry(&self, entry_id: Uuid) -> AppResult<Option<KnowledgeBaseEntry>>;

    /// List knowledge-base entries of an assistant
    async fn list_kb_entries(&self, assistant_id: Uuid) -> AppResult<Vec<KnowledgeBaseEntry>>;

    /// Persist upstream ids and status
    async fn update_kb_entry(&self, entry: &KnowledgeBaseEntry) -> AppResult<()>;

    /// Delete a knowledge-base entry
    async fn delete_kb_entry(&self, entry_id: Uuid) -> AppResult<bool>;
}
