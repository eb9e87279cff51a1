// ABOUTME: Route module organization for the Air Lab HTTP API
// ABOUTME: One router per domain plus shared ownership lookups used by several of them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! HTTP routes
//!
//! Each domain module exposes a `XxxRoutes::routes(resources)` constructor.
//! Handlers stay thin and delegate to [`crate::services`].

/// Admin-only user and usage management
pub mod admin;
/// Assistant CRUD, analyzer and widget designer
pub mod assistants;
/// Registration, login, logout and current user
pub mod auth;
/// Web chat conversations
pub mod conversations;
/// Google Docs import
pub mod google_docs;
/// Health check
pub mod health;
/// Photo editor
pub mod images;
/// Messenger integration CRUD
pub mod integrations;
/// Knowledge-base uploads
pub mod knowledge_base;
/// Private and public object downloads
pub mod objects;
/// Profile and billing of the current user
pub mod users;
/// Vector store pass-through
pub mod vector_store;
/// Inbound messenger webhooks
pub mod webhooks;
/// Public widget chat endpoint
pub mod widget;

pub use admin::AdminRoutes;
pub use assistants::AssistantRoutes;
pub use auth::AuthRoutes;
pub use conversations::ConversationRoutes;
pub use google_docs::GoogleDocsRoutes;
pub use health::HealthRoutes;
pub use images::ImageRoutes;
pub use integrations::IntegrationRoutes;
pub use knowledge_base::KnowledgeBaseRoutes;
pub use objects::ObjectRoutes;
pub use users::UserRoutes;
pub use vector_store::VectorStoreRoutes;
pub use webhooks::WebhookRoutes;
pub use widget::WidgetRoutes;

use crate::database_plugins::shared::validation::validate_ownership;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::Assistant;
use crate::resources::ServerResources;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;
use std::collections::HashMap;
use uuid::Uuid;

/// Load an assistant owned by `user_id`
///
/// Foreign assistants are reported as missing.
pub(crate) async fn owned_assistant(
    resources: &ServerResources,
    assistant_id: Uuid,
    user_id: Uuid,
) -> AppResult<Assistant> {
    let assistant = resources
        .database
        .get_assistant(assistant_id)
        .await?
        .ok_or_else(|| AppError::not_found("Assistant"))?;
    validate_ownership(assistant.user_id, user_id, "Assistant")?;
    Ok(assistant)
}

/// Parse a path or body id
pub(crate) fn parse_id(value: &str, entity: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| AppError::invalid_input(format!("Invalid {entity} id")))
}

/// A file part of a multipart form
#[derive(Debug, Clone)]
pub(crate) struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Parsed multipart form
#[derive(Debug, Default)]
pub(crate) struct MultipartForm {
    pub files: HashMap<String, UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    /// Take a required file part
    pub fn take_file(&mut self, name: &str) -> AppResult<UploadedFile> {
        self.files.remove(name).ok_or_else(|| {
            AppError::new(
                ErrorCode::MissingRequiredField,
                format!("Multipart field '{name}' is required"),
            )
        })
    }

    /// Text field value
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

fn multipart_error(e: &MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(ErrorCode::PayloadTooLarge, "Upload exceeds the size limit")
    } else {
        AppError::invalid_input(format!("Malformed multipart body: {}", e.body_text()))
    }
}

fn upload_too_large(max_part_bytes: usize) -> AppError {
    AppError::new(
        ErrorCode::PayloadTooLarge,
        format!("Upload exceeds the size limit of {max_part_bytes} bytes"),
    )
}

/// Read every part of a multipart body
///
/// Parts with a file name are files, all others are text fields. Any part
/// larger than `max_part_bytes` fails with `PAYLOAD_TOO_LARGE`.
pub(crate) async fn read_multipart(
    mut multipart: Multipart,
    max_part_bytes: usize,
) -> AppResult<MultipartForm> {
    let mut form = MultipartForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
        if bytes.len() > max_part_bytes {
            return Err(upload_too_large(max_part_bytes));
        }

        if let Some(file_name) = file_name {
            form.files.insert(
                name,
                UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                },
            );
        } else {
            let text = String::from_utf8(bytes.to_vec())
                .map_err(|_| AppError::invalid_input(format!("Field '{name}' is not UTF-8")))?;
            form.fields.insert(name, text);
        }
    }
    Ok(form)
}
