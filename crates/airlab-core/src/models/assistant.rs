// ABOUTME: Assistant model mirroring an OpenAI Assistants-API entity in the local store
// ABOUTME: Tools are stored as a JSON column using the Assistants v2 tool shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Function tool definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,
    /// Description shown to the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// Tool enabled on an assistant (Assistants v2 wire shape)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantTool {
    /// Sandboxed code execution
    CodeInterpreter,
    /// Retrieval over the attached vector store
    FileSearch,
    /// Custom function calling
    Function {
        /// Function definition
        function: FunctionDefinition,
    },
}

/// Locally mirrored assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    /// Local ID
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// ID of the remote `OpenAI` assistant once created
    pub openai_assistant_id: Option<String>,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// System instructions
    pub instructions: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Enabled tools
    pub tools: Vec<AssistantTool>,
    /// Vector store backing `file_search`
    pub vector_store_id: Option<String>,
    /// Free-form settings (widget design, channel defaults)
    pub settings: Value,
    /// Inactive assistants are hidden from public surfaces
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Assistant {
    /// Whether `file_search` is enabled
    #[must_use]
    pub fn has_file_search(&self) -> bool {
        self.tools.contains(&AssistantTool::FileSearch)
    }

    /// Enable `file_search` if it is not already present
    pub fn ensure_file_search(&mut self) {
        if !self.has_file_search() {
            self.tools.push(AssistantTool::FileSearch);
        }
    }
}
