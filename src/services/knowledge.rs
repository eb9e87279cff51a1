// ABOUTME: Knowledge-base ingestion shared by file uploads and Google Docs imports
// ABOUTME: Ensures the assistant has a linked vector store and attaches uploaded files to it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{Assistant, DocumentStatus, KnowledgeBaseEntry};
use crate::openai::{AssistantParams, AssistantsApi, FileObject};
use crate::storage::{new_object_path, ObjectMetadata, ObjectStorage};
use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

/// Return the assistant's vector store, creating and linking one if missing
///
/// A new store is named `"{assistant name} Knowledge Base"`. The assistant
/// gains the `file_search` tool, the `OpenAI` assistant is updated to search
/// the store, and the local record is saved. If linking a new store fails the
/// store is deleted again and the assistant keeps its previous tools.
///
/// # Errors
///
/// Returns an error if any `OpenAI` call or the database update fails
pub async fn ensure_vector_store(
    database: &Database,
    api: &dyn AssistantsApi,
    assistant: &mut Assistant,
) -> AppResult<String> {
    let previous_tools = assistant.tools.clone();
    if let Some(id) = assistant.vector_store_id.clone() {
        if !assistant.has_file_search() {
            assistant.ensure_file_search();
            if let Err(e) = link_vector_store(database, api, assistant).await {
                assistant.tools = previous_tools;
                return Err(e);
            }
        }
        return Ok(id);
    }

    let store = api
        .create_vector_store(&format!("{} Knowledge Base", assistant.name))
        .await?;
    info!(assistant_id = %assistant.id, vector_store_id = %store.id, "Created vector store");

    assistant.vector_store_id = Some(store.id.clone());
    assistant.ensure_file_search();
    if let Err(e) = link_vector_store(database, api, assistant).await {
        assistant.vector_store_id = None;
        assistant.tools = previous_tools;
        if let Err(cleanup) = api.delete_vector_store(&store.id).await {
            warn!(
                vector_store_id = %store.id,
                "Failed to delete unlinked vector store: {cleanup}"
            );
        }
        return Err(e);
    }
    Ok(store.id)
}

async fn link_vector_store(
    database: &Database,
    api: &dyn AssistantsApi,
    assistant: &mut Assistant,
) -> AppResult<()> {
    sync_remote(api, assistant).await?;
    assistant.updated_at = Utc::now();
    database.update_assistant(assistant).await
}

async fn sync_remote(api: &dyn AssistantsApi, assistant: &Assistant) -> AppResult<()> {
    if let Some(remote_id) = assistant.openai_assistant_id.as_deref() {
        api.update_assistant(remote_id, &AssistantParams::from_assistant(assistant))
            .await?;
    }
    Ok(())
}

/// Upload bytes to `OpenAI` and attach them to the assistant's vector store
///
/// # Errors
///
/// Returns an error if the upload, store creation or attach fails
pub async fn attach_file(
    database: &Database,
    api: &dyn AssistantsApi,
    assistant: &mut Assistant,
    file_name: &str,
    bytes: Vec<u8>,
    mime_type: Option<&str>,
) -> AppResult<(FileObject, String)> {
    let file = api.upload_file(file_name, bytes, mime_type).await?;
    let vector_store_id = match ensure_vector_store(database, api, assistant).await {
        Ok(id) => id,
        Err(e) => {
            discard_file(api, &file.id).await;
            return Err(e);
        }
    };
    if let Err(e) = api.add_vector_store_file(&vector_store_id, &file.id).await {
        discard_file(api, &file.id).await;
        return Err(e);
    }
    Ok((file, vector_store_id))
}

async fn discard_file(api: &dyn AssistantsApi, file_id: &str) {
    if let Err(e) = api.delete_file(file_id).await {
        warn!(file_id, "Failed to delete orphaned OpenAI file: {e}");
    }
}

/// An uploaded knowledge-base file
pub struct KnowledgeUpload {
    /// Client file name
    pub file_name: String,
    /// MIME type from the multipart part
    pub mime_type: Option<String>,
    /// File contents
    pub bytes: Bytes,
}

/// Store an uploaded file and index it for the assistant
///
/// The bytes always land in object storage first. OpenAI failures after that
/// are recorded on the entry as `failed` with the error text rather than
/// returned.
///
/// # Errors
///
/// Returns `INVALID_INPUT` for empty files and storage or database errors
pub async fn ingest_upload(
    database: &Database,
    api: &dyn AssistantsApi,
    storage: &dyn ObjectStorage,
    assistant: &mut Assistant,
    upload: KnowledgeUpload,
) -> AppResult<KnowledgeBaseEntry> {
    if upload.bytes.is_empty() {
        return Err(AppError::invalid_input("Uploaded file is empty"));
    }

    let object_path = new_object_path(&upload.file_name);
    storage
        .put(
            &object_path,
            upload.bytes.clone(),
            &ObjectMetadata {
                owner_id: assistant.user_id,
                content_type: upload.mime_type.clone(),
                file_name: upload.file_name.clone(),
            },
        )
        .await?;

    let mut entry = KnowledgeBaseEntry {
        id: Uuid::new_v4(),
        assistant_id: assistant.id,
        user_id: assistant.user_id,
        file_name: upload.file_name.clone(),
        object_path,
        mime_type: upload.mime_type.clone(),
        size_bytes: i64::try_from(upload.bytes.len()).unwrap_or(i64::MAX),
        openai_file_id: None,
        vector_store_id: None,
        status: DocumentStatus::Pending,
        error: None,
        created_at: Utc::now(),
    };
    database.create_kb_entry(&entry).await?;

    match attach_file(
        database,
        api,
        assistant,
        &upload.file_name,
        upload.bytes.to_vec(),
        upload.mime_type.as_deref(),
    )
    .await
    {
        Ok((file, vector_store_id)) => {
            entry.openai_file_id = Some(file.id);
            entry.vector_store_id = Some(vector_store_id);
            entry.status = DocumentStatus::Processed;
        }
        Err(e) => {
            warn!(entry_id = %entry.id, "Knowledge base indexing failed: {e}");
            entry.status = DocumentStatus::Failed;
            entry.error = Some(e.message);
        }
    }
    database.update_kb_entry(&entry).await?;
    Ok(entry)
}

/// Remove a knowledge-base entry with best-effort remote and object cleanup
///
/// # Errors
///
/// Returns an error only if the database delete fails
pub async fn remove_entry(
    database: &Database,
    api: &dyn AssistantsApi,
    storage: &dyn ObjectStorage,
    entry: &KnowledgeBaseEntry,
) -> AppResult<()> {
    if let Some(file_id) = entry.openai_file_id.as_deref() {
        if let Some(vector_store_id) = entry.vector_store_id.as_deref() {
            if let Err(e) = api.remove_vector_store_file(vector_store_id, file_id).await {
                warn!(file_id, "Failed to detach file from vector store: {e}");
            }
        }
        discard_file(api, file_id).await;
    }
    if let Err(e) = storage.delete(&entry.object_path).await {
        warn!(object_path = %entry.object_path, "Failed to delete stored object: {e}");
    }
    database.delete_kb_entry(entry.id).await?;
    Ok(())
}
