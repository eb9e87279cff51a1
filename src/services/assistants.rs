// ABOUTME: Assistant lifecycle service keeping local records and OpenAI assistants in step
// ABOUTME: Creation and updates go to OpenAI first; deletion cleans up remotely on a best-effort basis
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::constants::defaults;
use crate::database_plugins::factory::Database;
use crate::database_plugins::shared::validation::{
    validate_assistant_name, validate_model, validate_temperature,
};
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppResult;
use crate::models::{Assistant, AssistantTool};
use crate::openai::{AssistantParams, AssistantsApi};
use crate::storage::ObjectStorage;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

/// Fields accepted when creating an assistant
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssistantRequest {
    /// Display name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// System instructions
    #[serde(default)]
    pub instructions: Option<String>,
    /// Model, defaults to the configured model
    #[serde(default)]
    pub model: Option<String>,
    /// Temperature, defaults to 0.7
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Enabled tools
    #[serde(default)]
    pub tools: Vec<AssistantTool>,
    /// Existing vector store to search
    #[serde(default)]
    pub vector_store_id: Option<String>,
    /// Free-form UI settings
    #[serde(default)]
    pub settings: Option<Value>,
}

/// Partial assistant update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAssistantRequest {
    /// Display name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// System instructions
    pub instructions: Option<String>,
    /// Model
    pub model: Option<String>,
    /// Temperature
    pub temperature: Option<f32>,
    /// Enabled tools
    pub tools: Option<Vec<AssistantTool>>,
    /// Vector store to search
    pub vector_store_id: Option<String>,
    /// Free-form UI settings
    pub settings: Option<Value>,
    /// Whether the public widget and channels answer
    pub is_active: Option<bool>,
}

/// Create an assistant on `OpenAI` and persist its mirror
///
/// # Errors
///
/// Validation errors, upstream errors (nothing is stored), database errors
pub async fn create_assistant(
    database: &Database,
    api: &dyn AssistantsApi,
    user_id: Uuid,
    default_model: &str,
    request: CreateAssistantRequest,
) -> AppResult<Assistant> {
    let now = Utc::now();
    let mut assistant = Assistant {
        id: Uuid::new_v4(),
        user_id,
        openai_assistant_id: None,
        name: request.name.trim().to_owned(),
        description: request.description.filter(|d| !d.trim().is_empty()),
        instructions: request.instructions.unwrap_or_default(),
        model: request.model.unwrap_or_else(|| default_model.to_owned()),
        temperature: request.temperature.unwrap_or(defaults::TEMPERATURE),
        tools: request.tools,
        vector_store_id: request.vector_store_id.filter(|v| !v.is_empty()),
        settings: request.settings.unwrap_or_else(|| Value::Object(serde_json::Map::new())),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    validate(&assistant)?;
    if assistant.vector_store_id.is_some() {
        assistant.ensure_file_search();
    }

    let remote = api
        .create_assistant(&AssistantParams::from_assistant(&assistant))
        .await?;
    assistant.openai_assistant_id = Some(remote.id);
    database.create_assistant(&assistant).await?;
    info!(assistant_id = %assistant.id, user_id = %user_id, "Created assistant");
    Ok(assistant)
}

fn validate(assistant: &Assistant) -> AppResult<()> {
    validate_assistant_name(&assistant.name)?;
    validate_model(&assistant.model)?;
    validate_temperature(assistant.temperature)
}

/// Apply a partial update and push it to `OpenAI`
///
/// # Errors
///
/// Validation errors, upstream errors (nothing is stored), database errors
pub async fn update_assistant(
    database: &Database,
    api: &dyn AssistantsApi,
    mut assistant: Assistant,
    request: UpdateAssistantRequest,
) -> AppResult<Assistant> {
    if let Some(name) = request.name {
        assistant.name = name.trim().to_owned();
    }
    if let Some(description) = request.description {
        assistant.description = Some(description).filter(|d| !d.trim().is_empty());
    }
    if let Some(instructions) = request.instructions {
        assistant.instructions = instructions;
    }
    if let Some(model) = request.model {
        assistant.model = model;
    }
    if let Some(temperature) = request.temperature {
        assistant.temperature = temperature;
    }
    if let Some(tools) = request.tools {
        assistant.tools = tools;
    }
    if let Some(vector_store_id) = request.vector_store_id {
        assistant.vector_store_id = Some(vector_store_id).filter(|v| !v.is_empty());
    }
    if let Some(settings) = request.settings {
        assistant.settings = settings;
    }
    if let Some(is_active) = request.is_active {
        assistant.is_active = is_active;
    }
    validate(&assistant)?;
    if assistant.vector_store_id.is_some() {
        assistant.ensure_file_search();
    }

    if let Some(remote_id) = assistant.openai_assistant_id.as_deref() {
        api.update_assistant(remote_id, &AssistantParams::from_assistant(&assistant))
            .await?;
    }
    assistant.updated_at = Utc::now();
    database.update_assistant(&assistant).await?;
    Ok(assistant)
}

/// Delete an assistant locally after best-effort remote cleanup
///
/// # Errors
///
/// Returns an error only if the database delete fails
pub async fn delete_assistant(
    database: &Database,
    api: &dyn AssistantsApi,
    storage: &dyn ObjectStorage,
    assistant: &Assistant,
) -> AppResult<()> {
    delete_remote(api, assistant).await;
    delete_stored_objects(database, storage, assistant.id).await;

    database.delete_assistant(assistant.id).await?;
    info!(assistant_id = %assistant.id, "Deleted assistant");
    Ok(())
}

/// Delete the `OpenAI` assistant and vector store, logging failures
pub async fn delete_remote(api: &dyn AssistantsApi, assistant: &Assistant) {
    if let Some(remote_id) = assistant.openai_assistant_id.as_deref() {
        if let Err(e) = api.delete_assistant(remote_id).await {
            warn!(remote_id, "Failed to delete OpenAI assistant: {e}");
        }
    }
    if let Some(vector_store_id) = assistant.vector_store_id.as_deref() {
        if let Err(e) = api.delete_vector_store(vector_store_id).await {
            warn!(vector_store_id, "Failed to delete vector store: {e}");
        }
    }
}

/// Delete the stored knowledge-base files of an assistant, logging failures
pub async fn delete_stored_objects(
    database: &Database,
    storage: &dyn ObjectStorage,
    assistant_id: Uuid,
) {
    match database.list_kb_entries(assistant_id).await {
        Ok(entries) => {
            for entry in entries {
                if let Err(e) = storage.delete(&entry.object_path).await {
                    warn!(object_path = %entry.object_path, "Failed to delete stored object: {e}");
                }
            }
        }
        Err(e) => warn!(assistant_id = %assistant_id, "Failed to list knowledge base: {e}"),
    }
}
