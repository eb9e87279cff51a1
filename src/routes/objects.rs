// ABOUTME: Object storage route handlers for uploads, owner-only downloads and public files
// ABOUTME: Private objects carry owner metadata; public objects come from configured search paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::read_multipart;
use crate::errors::AppError;
use crate::middleware::authenticate;
use crate::resources::ServerResources;
use crate::storage::{find_public_object, new_object_path, validate_object_path, ObjectMetadata};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;

const OCTET_STREAM: &str = "application/octet-stream";

/// Content type from a file extension
fn content_type_for(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "txt" | "md" => "text/plain; charset=utf-8",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => OCTET_STREAM,
    }
}

/// Raster images are the only uploads a browser may render inline
fn renders_inline(content_type: &str) -> bool {
    content_type.starts_with("image/") && !content_type.starts_with("image/svg")
}

fn attachment_disposition(file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn file_response(bytes: Bytes, content_type: &str, disposition: Option<HeaderValue>) -> Response {
    let content_type = HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(OCTET_STREAM));
    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        ],
        bytes,
    )
        .into_response();
    if let Some(disposition) = disposition {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, disposition);
    }
    response
}

/// Object storage routes
pub struct ObjectRoutes;

impl ObjectRoutes {
    /// Create all object routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/objects/upload", post(Self::handle_upload))
            .route("/objects/*object_path", get(Self::handle_download))
            .route("/public-objects/*object_path", get(Self::handle_public))
            .with_state(resources)
    }

    async fn handle_upload(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        multipart: Multipart,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let file = read_multipart(multipart, resources.config.storage.max_upload_bytes)
            .await?
            .take_file("file")?;
        if file.bytes.is_empty() {
            return Err(AppError::invalid_input("Uploaded file is empty"));
        }

        let object_path = new_object_path(&file.file_name);
        resources
            .storage
            .put(
                &object_path,
                file.bytes,
                &ObjectMetadata {
                    owner_id: auth.user_id(),
                    content_type: file.content_type,
                    file_name: file.file_name,
                },
            )
            .await?;
        Ok((
            StatusCode::CREATED,
            Json(json!({ "object_path": object_path })),
        )
            .into_response())
    }

    /// Only the uploader may read a private object
    async fn handle_download(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(object_path): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let object_path = object_path.trim_start_matches('/');
        validate_object_path(object_path)?;

        let (bytes, metadata) = resources.storage.get(object_path).await?;
        if metadata.owner_id != auth.user_id() {
            return Err(AppError::not_found("Object"));
        }
        let content_type = metadata
            .content_type
            .as_deref()
            .unwrap_or_else(|| content_type_for(&metadata.file_name));
        let disposition =
            (!renders_inline(content_type)).then(|| attachment_disposition(&metadata.file_name));
        Ok(file_response(bytes, content_type, disposition))
    }

    async fn handle_public(
        State(resources): State<Arc<ServerResources>>,
        Path(object_path): Path<String>,
    ) -> Result<Response, AppError> {
        let object_path = object_path.trim_start_matches('/');
        let path = find_public_object(&resources.config.storage.public_search_paths, object_path)
            .await?
            .ok_or_else(|| AppError::not_found("Object"))?;
        let bytes = tokio::fs::read(&path).await?;
        Ok(file_response(
            Bytes::from(bytes),
            content_type_for(object_path),
            None,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a/b/logo.PNG"), "image/png");
        assert_eq!(content_type_for("notes"), OCTET_STREAM);
    }

    #[test]
    fn test_only_raster_images_render_inline() {
        assert!(renders_inline("image/png"));
        assert!(!renders_inline("image/svg+xml"));
        assert!(!renders_inline("text/html; charset=utf-8"));
    }

    #[test]
    fn test_attachment_disposition_strips_quotes() {
        let value = attachment_disposition("re\"port\r\n.html");
        assert_eq!(value.to_str().unwrap(), "attachment; filename=\"re_port__.html\"");
    }
}
