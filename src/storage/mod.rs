// ABOUTME: Object storage abstraction for uploaded knowledge-base files and images
// ABOUTME: Generates object paths and rejects path traversal before any backend sees a key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Local filesystem backend
pub mod local;

pub use local::{find_public_object, LocalObjectStorage};

/// Prefix of every uploaded object
const UPLOAD_PREFIX: &str = "uploads";

/// Longest file name kept in an object path
const MAX_FILE_NAME_CHARS: usize = 128;

/// Metadata stored next to each object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// User allowed to read the object
    pub owner_id: Uuid,
    /// MIME type given at upload
    pub content_type: Option<String>,
    /// Original file name
    pub file_name: String,
}

/// Object storage backend
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `object_path`
    async fn put(&self, object_path: &str, bytes: Bytes, metadata: &ObjectMetadata)
        -> AppResult<()>;

    /// Read an object and its metadata
    async fn get(&self, object_path: &str) -> AppResult<(Bytes, ObjectMetadata)>;

    /// Remove an object; missing objects are not an error
    async fn delete(&self, object_path: &str) -> AppResult<()>;
}

/// Allocate a fresh object path `uploads/<uuid>/<sanitized name>`
#[must_use]
pub fn new_object_path(file_name: &str) -> String {
    format!(
        "{UPLOAD_PREFIX}/{}/{}",
        Uuid::new_v4(),
        sanitize_file_name(file_name)
    )
}

/// Reduce a client-supplied file name to a safe single path segment
#[must_use]
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILE_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_owned()
    } else {
        cleaned.to_owned()
    }
}

/// Reject absolute paths, empty segments and `..`
///
/// # Errors
///
/// Returns `INVALID_INPUT` for any path that could escape the storage root
pub fn validate_object_path(object_path: &str) -> AppResult<()> {
    if object_path.is_empty()
        || object_path.starts_with('/')
        || object_path.contains('\\')
        || object_path.contains('\0')
    {
        return Err(AppError::invalid_input("Invalid object path"));
    }
    if object_path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(AppError::invalid_input("Invalid object path"));
    }
    Ok(())
}
