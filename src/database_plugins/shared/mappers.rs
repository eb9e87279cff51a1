// ABOUTME: Model to SQL row conversion helpers for database operations
// ABOUTME: Generic row parsing functions used by both the PostgreSQL and SQLite backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! Model ↔ SQL row conversion helpers
//!
//! Both backends store ids, enums and JSON documents as TEXT, so a single set
//! of generic parsers serves `SqliteRow` and `PgRow` alike.

use crate::errors::{AppError, AppResult};
use crate::models::{
    Assistant, Conversation, GoogleDocsDocument, Integration, KnowledgeBaseEntry, Session, User,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::warn;
use uuid::Uuid;

/// Read a column, mapping decode failures to a database error naming the column
fn column<'r, R, T>(row: &'r R, name: &str) -> AppResult<T>
where
    R: sqlx::Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
    T: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
{
    row.try_get(name)
        .map_err(|e| AppError::database(format!("Failed to get column '{name}': {e}")))
}

/// Parse a TEXT uuid column
fn uuid_column<R>(row: &R, name: &str) -> AppResult<Uuid>
where
    R: sqlx::Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
    String: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
{
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw)
        .map_err(|e| AppError::database(format!("Invalid UUID in column '{name}': {e}")))
}

/// Parse a TEXT enum column through its `FromStr` implementation
fn enum_column<R, E>(row: &R, name: &str) -> AppResult<E>
where
    R: sqlx::Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
    String: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    E: std::str::FromStr<Err = AppError>,
{
    let raw: String = column(row, name)?;
    raw.parse()
        .map_err(|e: AppError| AppError::database(format!("Column '{name}': {}", e.message)))
}

/// Parse a JSON TEXT column, falling back to the default on malformed data
fn json_column<R, T>(row: &R, name: &str) -> AppResult<T>
where
    R: sqlx::Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
    String: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    T: DeserializeOwned + Default,
{
    let raw: String = column(row, name)?;
    Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(column = name, error = %e, "Malformed JSON column, using default");
        T::default()
    }))
}

/// Parse User from database row (database-agnostic)
///
/// # Errors
/// * Returns error if required fields are missing or have invalid types
pub fn parse_user_from_row<R>(row: &R) -> AppResult<User>
where
    R: sqlx::Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
    String: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    Option<String>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    i64: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    bool: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    DateTime<Utc>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
{
    Ok(User {
        id: uuid_column(row, "id")?,
        email: column(row, "email")?,
        display_name: column(row, "display_name")?,
        password_hash: column(row, "password_hash")?,
        role: enum_column(row, "role")?,
        plan: enum_column(row, "plan")?,
        balance_cents: column(row, "balance_cents")?,
        messages_used: column(row, "messages_used")?,
        usage_period_start: column(row, "usage_period_start")?,
        is_active: column(row, "is_active")?,
        created_at: column(row, "created_at")?,
        last_active: column(row, "last_active")?,
    })
}

/// Parse Session from database row
pub fn parse_session_from_row<R>(row: &R) -> AppResult<Session>
where
    R: sqlx::Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
    String: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    Option<String>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    DateTime<Utc>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
{
    Ok(Session {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        user_agent: column(row, "user_agent")?,
        expires_at: column(row, "expires_at")?,
        created_at: column(row, "created_at")?,
    })
}

/// Parse Assistant from database row
///
/// `tools` and `settings` are JSON TEXT columns; malformed JSON is logged and
/// replaced by an empty value instead of failing the read.
pub fn parse_assistant_from_row<R>(row: &R) -> AppResult<Assistant>
where
    R: sqlx::Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
    String: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    Option<String>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    f64: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    bool: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    DateTime<Utc>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
{
    let temperature: f64 = column(row, "temperature")?;
    let settings: serde_json::Value = json_column(row, "settings")?;

    Ok(Assistant {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        openai_assistant_id: column(row, "openai_assistant_id")?,
        name: column(row, "name")?,
        description: column(row, "description")?,
        instructions: column(row, "instructions")?,
        model: column(row, "model")?,
        temperature: temperature as f32,
        tools: json_column(row, "tools")?,
        vector_store_id: column(row, "vector_store_id")?,
        settings: if settings.is_null() {
            serde_json::json!({})
        } else {
            settings
        },
        is_active: column(row, "is_active")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

/// Parse Conversation from database row
pub fn parse_conversation_from_row<R>(row: &R) -> AppResult<Conversation>
where
    R: sqlx::Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
    String: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    Option<String>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    DateTime<Utc>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
{
    Ok(Conversation {
        id: uuid_column(row, "id")?,
        assistant_id: uuid_column(row, "assistant_id")?,
        user_id: uuid_column(row, "user_id")?,
        thread_id: column(row, "thread_id")?,
        channel: enum_column(row, "channel")?,
        external_chat_id: column(row, "external_chat_id")?,
        title: column(row, "title")?,
        messages: json_column(row, "messages")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

/// Parse `GoogleDocsDocument` from database row
pub fn parse_google_doc_from_row<R>(row: &R) -> AppResult<GoogleDocsDocument>
where
    R: sqlx::Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
    String: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    Option<String>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    i64: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    DateTime<Utc>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
{
    Ok(GoogleDocsDocument {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        assistant_id: uuid_column(row, "assistant_id")?,
        document_id: column(row, "document_id")?,
        url: column(row, "url")?,
        title: column(row, "title")?,
        summary: column(row, "summary")?,
        raw_length: column(row, "raw_length")?,
        openai_file_id: column(row, "openai_file_id")?,
        vector_store_id: column(row, "vector_store_id")?,
        status: enum_column(row, "status")?,
        error: column(row, "error")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

/// Parse Integration from database row
pub fn parse_integration_from_row<R>(row: &R) -> AppResult<Integration>
where
    R: sqlx::Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
    String: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    bool: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    DateTime<Utc>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
{
    Ok(Integration {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        assistant_id: uuid_column(row, "assistant_id")?,
        channel: enum_column(row, "channel")?,
        name: column(row, "name")?,
        config: json_column(row, "config")?,
        webhook_secret: column(row, "webhook_secret")?,
        is_active: column(row, "is_active")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

/// Parse `KnowledgeBaseEntry` from database row
pub fn parse_kb_entry_from_row<R>(row: &R) -> AppResult<KnowledgeBaseEntry>
where
    R: sqlx::Row,
    for<'a> &'a str: sqlx::ColumnIndex<R>,
    String: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    Option<String>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    i64: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
    DateTime<Utc>: for<'a> sqlx::Type<R::Database> + for<'a> sqlx::Decode<'a, R::Database>,
{
    Ok(KnowledgeBaseEntry {
        id: uuid_column(row, "id")?,
        assistant_id: uuid_column(row, "assistant_id")?,
        user_id: uuid_column(row, "user_id")?,
        file_name: column(row, "file_name")?,
        object_path: column(row, "object_path")?,
        mime_type: column(row, "mime_type")?,
        size_bytes: column(row, "size_bytes")?,
        openai_file_id: column(row, "openai_file_id")?,
        vector_store_id: column(row, "vector_store_id")?,
        status: enum_column(row, "status")?,
        error: column(row, "error")?,
        created_at: column(row, "created_at")?,
    })
}
