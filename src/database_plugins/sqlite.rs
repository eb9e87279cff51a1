// ABOUTME: SQLite implementation of the DatabaseProvider trait
// ABOUTME: Used for local development and tests, including in-memory databases
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! `SQLite` database implementation
//!
//! Ids, enums and JSON documents are TEXT columns; timestamps use the sqlx
//! chrono encoding. In-memory databases run on a single pooled connection so
//! every query sees the same schema.

use super::shared::mappers::{
    parse_assistant_from_row, parse_conversation_from_row, parse_google_doc_from_row,
    parse_integration_from_row, parse_kb_entry_from_row, parse_session_from_row,
    parse_user_from_row,
};
use super::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Assistant, BillingPlan, Channel, Conversation, GoogleDocsDocument, Integration,
    KnowledgeBaseEntry, Session, User, UserRole,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Schema statements, applied in order
const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        display_name TEXT,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user',
        plan TEXT NOT NULL DEFAULT 'free',
        balance_cents INTEGER NOT NULL DEFAULT 0,
        messages_used INTEGER NOT NULL DEFAULT 0,
        usage_period_start TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        last_active TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        user_agent TEXT,
        expires_at TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS assistants (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        openai_assistant_id TEXT,
        name TEXT NOT NULL,
        description TEXT,
        instructions TEXT NOT NULL,
        model TEXT NOT NULL,
        temperature REAL NOT NULL,
        tools TEXT NOT NULL DEFAULT '[]',
        vector_store_id TEXT,
        settings TEXT NOT NULL DEFAULT '{}',
        is_active BOOLEAN NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS conversations (
        id TEXT PRIMARY KEY,
        assistant_id TEXT NOT NULL REFERENCES assistants(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        thread_id TEXT,
        channel TEXT NOT NULL,
        external_chat_id TEXT,
        title TEXT NOT NULL,
        messages TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS google_docs_documents (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        assistant_id TEXT NOT NULL REFERENCES assistants(id) ON DELETE CASCADE,
        document_id TEXT NOT NULL,
        url TEXT NOT NULL,
        title TEXT NOT NULL,
        summary TEXT,
        raw_length INTEGER NOT NULL DEFAULT 0,
        openai_file_id TEXT,
        vector_store_id TEXT,
        status TEXT NOT NULL,
        error TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS integrations (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        assistant_id TEXT NOT NULL REFERENCES assistants(id) ON DELETE CASCADE,
        channel TEXT NOT NULL,
        name TEXT NOT NULL,
        config TEXT NOT NULL DEFAULT '{}',
        webhook_secret TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS knowledge_base (
        id TEXT PRIMARY KEY,
        assistant_id TEXT NOT NULL REFERENCES assistants(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        file_name TEXT NOT NULL,
        object_path TEXT NOT NULL,
        mime_type TEXT,
        size_bytes INTEGER NOT NULL,
        openai_file_id TEXT,
        vector_store_id TEXT,
        status TEXT NOT NULL,
        error TEXT,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_assistants_user ON assistants(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_conversations_user ON conversations(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_conversations_external ON conversations(assistant_id, channel, external_chat_id)",
    "CREATE INDEX IF NOT EXISTS idx_google_docs_assistant ON google_docs_documents(assistant_id)",
    "CREATE INDEX IF NOT EXISTS idx_integrations_assistant ON integrations(assistant_id)",
    "CREATE INDEX IF NOT EXISTS idx_knowledge_base_assistant ON knowledge_base(assistant_id)",
];

const USER_COLUMNS: &str = "id, email, display_name, password_hash, role, plan, balance_cents, \
     messages_used, usage_period_start, is_active, created_at, last_active";
const ASSISTANT_COLUMNS: &str = "id, user_id, openai_assistant_id, name, description, instructions, \
     model, temperature, tools, vector_store_id, settings, is_active, created_at, updated_at";
const CONVERSATION_COLUMNS: &str = "id, assistant_id, user_id, thread_id, channel, external_chat_id, \
     title, messages, created_at, updated_at";
const GOOGLE_DOC_COLUMNS: &str = "id, user_id, assistant_id, document_id, url, title, summary, \
     raw_length, openai_file_id, vector_store_id, status, error, created_at, updated_at";
const INTEGRATION_COLUMNS: &str = "id, user_id, assistant_id, channel, name, config, webhook_secret, \
     is_active, created_at, updated_at";
const KB_COLUMNS: &str = "id, assistant_id, user_id, file_name, object_path, mime_type, size_bytes, \
     openai_file_id, vector_store_id, status, error, created_at";

/// `SQLite` database implementation
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Get a reference to the connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn count(&self, table: &str) -> AppResult<i64> {
        let row = sqlx::query(&format!("SELECT COUNT(*) AS count FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }
}

#[async_trait]
impl DatabaseProvider for SqliteDatabase {
    async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid SQLite URL '{database_url}': {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = database_url.contains(":memory:");
        if !in_memory {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }

        // Each in-memory connection is its own database: keep exactly one alive
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(10)
        };

        let pool = pool_options.connect_with(options).await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        }
        info!("SQLite schema ready ({} statements)", SCHEMA.len());
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ================================
    // User Management
    // ================================

    async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, password_hash, role, plan, balance_cents,
                               messages_used, usage_period_start, is_active, created_at, last_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(user.id.to_string())
        .bind(user.email.to_lowercase())
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.plan.as_str())
        .bind(user.balance_cents)
        .bind(user.messages_used)
        .bind(user.usage_period_start)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.last_active)
        .execute(&self.pool)
        .await?;

        debug!(user_id = %user.id, "Created user");
        Ok(user.id)
    }

    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(parse_user_from_row).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(parse_user_from_row).transpose()
    }

    async fn list_users(&self, limit: i64, offset: i64) -> AppResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(parse_user_from_row).collect()
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        display_name: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE users
            SET display_name = COALESCE($1, display_name),
                password_hash = COALESCE($2, password_hash)
            WHERE id = $3
            ",
        )
        .bind(display_name)
        .bind(password_hash)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_user_status(
        &self,
        user_id: Uuid,
        role: UserRole,
        is_active: bool,
    ) -> AppResult<()> {
        sqlx::query("UPDATE users SET role = $1, is_active = $2 WHERE id = $3")
            .bind(role.as_str())
            .bind(is_active)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn change_user_plan(
        &self,
        user_id: Uuid,
        plan: BillingPlan,
        price_cents: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET plan = $1, balance_cents = balance_cents - $2
            WHERE id = $3 AND balance_cents >= $2
            ",
        )
        .bind(plan.as_str())
        .bind(price_cents)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_user_plan(&self, user_id: Uuid, plan: BillingPlan) -> AppResult<()> {
        sqlx::query("UPDATE users SET plan = $1 WHERE id = $2")
            .bind(plan.as_str())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn adjust_user_balance(&self, user_id: Uuid, delta_cents: i64) -> AppResult<i64> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET balance_cents = CASE WHEN balance_cents + $1 < 0 THEN 0 ELSE balance_cents + $1 END
            WHERE id = $2
            ",
        )
        .bind(delta_cents)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }

        let row = sqlx::query("SELECT balance_cents FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("balance_cents")?)
    }

    async fn increment_messages_used(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET messages_used = messages_used + 1 WHERE id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reset_messages_used(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET messages_used = 0 WHERE id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn roll_usage_period(
        &self,
        user_id: Uuid,
        period_start: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET messages_used = 0, usage_period_start = $1
            WHERE id = $2 AND usage_period_start < $1
            ",
        )
        .bind(period_start)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_last_active(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_active = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_user_count(&self) -> AppResult<i64> {
        self.count("users").await
    }

    // ================================
    // Sessions
    // ================================

    async fn create_session(&self, session: &Session) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO sessions (id, user_id, user_agent, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(&session.user_agent)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_session(&self, session_id: Uuid) -> AppResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT id, user_id, user_agent, expires_at, created_at FROM sessions WHERE id = $1",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(parse_session_from_row).transpose()
    }

    async fn delete_session(&self, session_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user_sessions(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ================================
    // Assistants
    // ================================

    async fn create_assistant(&self, assistant: &Assistant) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO assistants (id, user_id, openai_assistant_id, name, description, instructions,
                                    model, temperature, tools, vector_store_id, settings, is_active,
                                    created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(assistant.id.to_string())
        .bind(assistant.user_id.to_string())
        .bind(&assistant.openai_assistant_id)
        .bind(&assistant.name)
        .bind(&assistant.description)
        .bind(&assistant.instructions)
        .bind(&assistant.model)
        .bind(f64::from(assistant.temperature))
        .bind(serde_json::to_string(&assistant.tools)?)
        .bind(&assistant.vector_store_id)
        .bind(serde_json::to_string(&assistant.settings)?)
        .bind(assistant.is_active)
        .bind(assistant.created_at)
        .bind(assistant.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(assistant.id)
    }

    async fn get_assistant(&self, assistant_id: Uuid) -> AppResult<Option<Assistant>> {
        let row = sqlx::query(&format!(
            "SELECT {ASSISTANT_COLUMNS} FROM assistants WHERE id = $1"
        ))
        .bind(assistant_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(parse_assistant_from_row).transpose()
    }

    async fn list_assistants_for_user(&self, user_id: Uuid) -> AppResult<Vec<Assistant>> {
        let rows = sqlx::query(&format!(
            "SELECT {ASSISTANT_COLUMNS} FROM assistants WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(parse_assistant_from_row).collect()
    }

    async fn list_all_assistants(&self, limit: i64, offset: i64) -> AppResult<Vec<Assistant>> {
        let rows = sqlx::query(&format!(
            "SELECT {ASSISTANT_COLUMNS} FROM assistants ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(parse_assistant_from_row).collect()
    }

    async fn update_assistant(&self, assistant: &Assistant) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE assistants
            SET openai_assistant_id = $1, name = $2, description = $3, instructions = $4,
                model = $5, temperature = $6, tools = $7, vector_store_id = $8, settings = $9,
                is_active = $10, updated_at = $11
            WHERE id = $12
            ",
        )
        .bind(&assistant.openai_assistant_id)
        .bind(&assistant.name)
        .bind(&assistant.description)
        .bind(&assistant.instructions)
        .bind(&assistant.model)
        .bind(f64::from(assistant.temperature))
        .bind(serde_json::to_string(&assistant.tools)?)
        .bind(&assistant.vector_store_id)
        .bind(serde_json::to_string(&assistant.settings)?)
        .bind(assistant.is_active)
        .bind(assistant.updated_at)
        .bind(assistant.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_assistant(&self, assistant_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM assistants WHERE id = $1")
            .bind(assistant_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_assistant_count(&self) -> AppResult<i64> {
        self.count("assistants").await
    }

    // ================================
    // Conversations
    // ================================

    async fn create_conversation(&self, conversation: &Conversation) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO conversations (id, assistant_id, user_id, thread_id, channel, external_chat_id,
                                       title, messages, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(conversation.id.to_string())
        .bind(conversation.assistant_id.to_string())
        .bind(conversation.user_id.to_string())
        .bind(&conversation.thread_id)
        .bind(conversation.channel.as_str())
        .bind(&conversation.external_chat_id)
        .bind(&conversation.title)
        .bind(serde_json::to_string(&conversation.messages)?)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(conversation.id)
    }

    async fn get_conversation(&self, conversation_id: Uuid) -> AppResult<Option<Conversation>> {
        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1"
        ))
        .bind(conversation_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(parse_conversation_from_row).transpose()
    }

    async fn find_conversation_by_external(
        &self,
        assistant_id: Uuid,
        channel: Channel,
        external_chat_id: &str,
    ) -> AppResult<Option<Conversation>> {
        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations \
             WHERE assistant_id = $1 AND channel = $2 AND external_chat_id = $3 \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(assistant_id.to_string())
        .bind(channel.as_str())
        .bind(external_chat_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(parse_conversation_from_row).transpose()
    }

    async fn list_conversations(
        &self,
        user_id: Uuid,
        assistant_id: Option<Uuid>,
    ) -> AppResult<Vec<Conversation>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations \
             WHERE user_id = $1 AND ($2 IS NULL OR assistant_id = $2) \
             ORDER BY updated_at DESC"
        ))
        .bind(user_id.to_string())
        .bind(assistant_id.map(|id| id.to_string()))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(parse_conversation_from_row).collect()
    }

    async fn update_conversation(&self, conversation: &Conversation) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE conversations
            SET thread_id = $1, title = $2, messages = $3, updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(&conversation.thread_id)
        .bind(&conversation.title)
        .bind(serde_json::to_string(&conversation.messages)?)
        .bind(conversation.updated_at)
        .bind(conversation.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_conversation(&self, conversation_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(conversation_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_conversation_count(&self) -> AppResult<i64> {
        self.count("conversations").await
    }

    // ================================
    // Google Docs
    // ================================

    async fn create_google_doc(&self, document: &GoogleDocsDocument) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO google_docs_documents (id, user_id, assistant_id, document_id, url, title,
                                               summary, raw_length, openai_file_id, vector_store_id,
                                               status, error, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(document.id.to_string())
        .bind(document.user_id.to_string())
        .bind(document.assistant_id.to_string())
        .bind(&document.document_id)
        .bind(&document.url)
        .bind(&document.title)
        .bind(&document.summary)
        .bind(document.raw_length)
        .bind(&document.openai_file_id)
        .bind(&document.vector_store_id)
        .bind(document.status.as_str())
        .bind(&document.error)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(document.id)
    }

    async fn get_google_doc(&self, document_id: Uuid) -> AppResult<Option<GoogleDocsDocument>> {
        let row = sqlx::query(&format!(
            "SELECT {GOOGLE_DOC_COLUMNS} FROM google_docs_documents WHERE id = $1"
        ))
        .bind(document_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(parse_google_doc_from_row).transpose()
    }

    async fn list_google_docs(&self, assistant_id: Uuid) -> AppResult<Vec<GoogleDocsDocument>> {
        let rows = sqlx::query(&format!(
            "SELECT {GOOGLE_DOC_COLUMNS} FROM google_docs_documents \
             WHERE assistant_id = $1 ORDER BY created_at DESC"
        ))
        .bind(assistant_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(parse_google_doc_from_row).collect()
    }

    async fn update_google_doc(&self, document: &GoogleDocsDocument) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE google_docs_documents
            SET title = $1, summary = $2, raw_length = $3, openai_file_id = $4,
                vector_store_id = $5, status = $6, error = $7, updated_at = $8
            WHERE id = $9
            ",
        )
        .bind(&document.title)
        .bind(&document.summary)
        .bind(document.raw_length)
        .bind(&document.openai_file_id)
        .bind(&document.vector_store_id)
        .bind(document.status.as_str())
        .bind(&document.error)
        .bind(document.updated_at)
        .bind(document.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_google_doc(&self, document_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM google_docs_documents WHERE id = $1")
            .bind(document_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ================================
    // Integrations
    // ================================

    async fn create_integration(&self, integration: &Integration) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO integrations (id, user_id, assistant_id, channel, name, config,
                                      webhook_secret, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(integration.id.to_string())
        .bind(integration.user_id.to_string())
        .bind(integration.assistant_id.to_string())
        .bind(integration.channel.as_str())
        .bind(&integration.name)
        .bind(serde_json::to_string(&integration.config)?)
        .bind(&integration.webhook_secret)
        .bind(integration.is_active)
        .bind(integration.created_at)
        .bind(integration.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(integration.id)
    }

    async fn get_integration(&self, integration_id: Uuid) -> AppResult<Option<Integration>> {
        let row = sqlx::query(&format!(
            "SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE id = $1"
        ))
        .bind(integration_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(parse_integration_from_row).transpose()
    }

    async fn list_integrations_for_user(&self, user_id: Uuid) -> AppResult<Vec<Integration>> {
        let rows = sqlx::query(&format!(
            "SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(parse_integration_from_row).collect()
    }

    async fn list_integrations_for_assistant(
        &self,
        assistant_id: Uuid,
    ) -> AppResult<Vec<Integration>> {
        let rows = sqlx::query(&format!(
            "SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE assistant_id = $1 ORDER BY created_at DESC"
        ))
        .bind(assistant_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(parse_integration_from_row).collect()
    }

    async fn update_integration(&self, integration: &Integration) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE integrations
            SET name = $1, config = $2, is_active = $3, updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(&integration.name)
        .bind(serde_json::to_string(&integration.config)?)
        .bind(integration.is_active)
        .bind(integration.updated_at)
        .bind(integration.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_integration(&self, integration_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM integrations WHERE id = $1")
            .bind(integration_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ================================
    // Knowledge Base
    // ================================

    async fn create_kb_entry(&self, entry: &KnowledgeBaseEntry) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO knowledge_base (id, assistant_id, user_id, file_name, object_path, mime_type,
                                        size_bytes, openai_file_id, vector_store_id, status, error,
                                        created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.assistant_id.to_string())
        .bind(entry.user_id.to_string())
        .bind(&entry.file_name)
        .bind(&entry.object_path)
        .bind(&entry.mime_type)
        .bind(entry.size_bytes)
        .bind(&entry.openai_file_id)
        .bind(&entry.vector_store_id)
        .bind(entry.status.as_str())
        .bind(&entry.error)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(entry.id)
    }

    async fn get_kb_entry(&self, entry_id: Uuid) -> AppResult<Option<KnowledgeBaseEntry>> {
        let row = sqlx::query(&format!("SELECT {KB_COLUMNS} FROM knowledge_base WHERE id = $1"))
            .bind(entry_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(parse_kb_entry_from_row).transpose()
    }

    async fn list_kb_entries(&self, assistant_id: Uuid) -> AppResult<Vec<KnowledgeBaseEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {KB_COLUMNS} FROM knowledge_base WHERE assistant_id = $1 ORDER BY created_at DESC"
        ))
        .bind(assistant_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(parse_kb_entry_from_row).collect()
    }

    async fn update_kb_entry(&self, entry: &KnowledgeBaseEntry) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE knowledge_base
            SET openai_file_id = $1, vector_store_id = $2, status = $3, error = $4
            WHERE id = $5
            ",
        )
        .bind(&entry.openai_file_id)
        .bind(&entry.vector_store_id)
        .bind(entry.status.as_str())
        .bind(&entry.error)
        .bind(entry.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_kb_entry(&self, entry_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM knowledge_base WHERE id = $1")
            .bind(entry_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
