// ABOUTME: Knowledge-base models for uploaded files and imported Google Docs
// ABOUTME: Both track the OpenAI file and vector store they were attached to
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ingestion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Accepted, not yet attached
    Pending,
    /// Attached to the vector store
    Processed,
    /// An upstream step failed
    Failed,
}

string_enum!(DocumentStatus {
    Pending => "pending",
    Processed => "processed",
    Failed => "failed",
});

/// Imported Google Docs document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleDocsDocument {
    /// Local ID
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Assistant the document feeds
    pub assistant_id: Uuid,
    /// Google document ID
    pub document_id: String,
    /// URL as submitted
    pub url: String,
    /// Title used for the uploaded file
    pub title: String,
    /// Summary produced for the knowledge base
    pub summary: Option<String>,
    /// Length of the extracted text in characters
    pub raw_length: i64,
    /// Uploaded `OpenAI` file
    pub openai_file_id: Option<String>,
    /// Vector store the file was attached to
    pub vector_store_id: Option<String>,
    /// Ingestion state
    pub status: DocumentStatus,
    /// Failure reason
    pub error: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Uploaded knowledge-base file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseEntry {
    /// Local ID
    pub id: Uuid,
    /// Assistant the file feeds
    pub assistant_id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Original file name
    pub file_name: String,
    /// Path in object storage
    pub object_path: String,
    /// Declared content type
    pub mime_type: Option<String>,
    /// Size of the upload
    pub size_bytes: i64,
    /// Uploaded `OpenAI` file
    pub openai_file_id: Option<String>,
    /// Vector store the file was attached to
    pub vector_store_id: Option<String>,
    /// Ingestion state
    pub status: DocumentStatus,
    /// Why indexing failed
    pub error: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
