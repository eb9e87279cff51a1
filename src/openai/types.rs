// ABOUTME: Wire types for the OpenAI Assistants v2, files, vector store, chat and image endpoints
// ABOUTME: Only the fields the server reads or writes are modelled
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::models::AssistantTool;
use serde::{Deserialize, Serialize};

// ============================================================================
// Assistants
// ============================================================================

/// Create/modify payload for an assistant
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssistantParams {
    /// Model name
    pub model: String,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// System instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Enabled tools
    pub tools: Vec<AssistantTool>,
    /// Vector stores searched by `file_search`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<ToolResources>,
}

impl AssistantParams {
    /// Build the payload mirroring a local assistant record
    #[must_use]
    pub fn from_assistant(assistant: &crate::models::Assistant) -> Self {
        Self {
            model: assistant.model.clone(),
            name: Some(assistant.name.clone()),
            description: assistant.description.clone(),
            instructions: Some(assistant.instructions.clone()),
            temperature: Some(assistant.temperature),
            tools: assistant.tools.clone(),
            tool_resources: assistant
                .vector_store_id
                .as_ref()
                .map(|id| ToolResources::file_search(id.clone())),
        }
    }
}

/// Tool resources attached to an assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResources {
    /// File search configuration
    pub file_search: FileSearchResources,
}

impl ToolResources {
    /// Resources pointing `file_search` at one vector store
    #[must_use]
    pub fn file_search(vector_store_id: String) -> Self {
        Self {
            file_search: FileSearchResources {
                vector_store_ids: vec![vector_store_id],
            },
        }
    }
}

/// Vector stores used by `file_search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSearchResources {
    /// Vector store IDs
    pub vector_store_ids: Vec<String>,
}

/// Assistant object returned by `OpenAI`
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteAssistant {
    /// `asst_...` identifier
    pub id: String,
    /// Model
    #[serde(default)]
    pub model: String,
}

/// Deletion acknowledgement
#[derive(Debug, Deserialize)]
pub(crate) struct DeletionStatus {
    #[serde(default)]
    pub deleted: bool,
}

// ============================================================================
// Threads, messages, runs
// ============================================================================

/// Thread object
#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    /// `thread_...` identifier
    pub id: String,
}

/// Message inside a thread
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMessage {
    /// `msg_...` identifier
    pub id: String,
    /// `user` or `assistant`
    pub role: String,
    /// Content parts
    #[serde(default)]
    pub content: Vec<MessageContent>,
    /// Run that produced the message, for assistant messages
    #[serde(default)]
    pub run_id: Option<String>,
    /// Unix timestamp
    #[serde(default)]
    pub created_at: i64,
}

impl ThreadMessage {
    /// Concatenated text of all text parts
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                MessageContent::Text { text } => Some(text.value.as_str()),
                MessageContent::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Content part of a message
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    /// Text content
    Text {
        /// Text payload
        text: TextContent,
    },
    /// Images and anything newer
    #[serde(other)]
    Other,
}

/// Text payload of a message part
#[derive(Debug, Clone, Deserialize)]
pub struct TextContent {
    /// The text
    pub value: String,
}

/// Paged list wrapper
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    pub data: Vec<T>,
}

/// Run lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Waiting to start
    Queued,
    /// Executing
    InProgress,
    /// Waiting for tool outputs
    RequiresAction,
    /// Cancellation requested
    Cancelling,
    /// Cancelled
    Cancelled,
    /// Failed
    Failed,
    /// Finished successfully
    Completed,
    /// Stopped early (token limits)
    Incomplete,
    /// Timed out on the `OpenAI` side
    Expired,
    /// Status added after this client was written
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Whether polling can stop
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Expired
        )
    }

    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        }
    }
}

/// Run object
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    /// `run_...` identifier
    pub id: String,
    /// Current status
    pub status: RunStatus,
    /// Error details for failed runs
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// Error attached to a failed run
#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    /// Error code
    #[serde(default)]
    pub code: Option<String>,
    /// Error message
    pub message: String,
}

// ============================================================================
// Files and vector stores
// ============================================================================

/// Uploaded file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileObject {
    /// `file-...` identifier
    pub id: String,
    /// Original file name
    #[serde(default)]
    pub filename: String,
    /// Size in bytes
    #[serde(default)]
    pub bytes: i64,
}

/// File counts of a vector store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileCounts {
    /// Files still processing
    #[serde(default)]
    pub in_progress: i64,
    /// Files ready for search
    #[serde(default)]
    pub completed: i64,
    /// Files that failed to index
    #[serde(default)]
    pub failed: i64,
    /// All files
    #[serde(default)]
    pub total: i64,
}

/// Vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStore {
    /// `vs_...` identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// File counters
    #[serde(default)]
    pub file_counts: FileCounts,
}

/// File attached to a vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreFile {
    /// File identifier
    pub id: String,
    /// Indexing status
    #[serde(default)]
    pub status: String,
}

// ============================================================================
// Chat completions
// ============================================================================

/// Chat message for completions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// System message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_owned(),
            content: content.into(),
        }
    }

    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            content: content.into(),
        }
    }
}

/// Chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model
    pub model: String,
    /// Conversation
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Output token cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Set to `{"type":"json_object"}` to force JSON output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// ============================================================================
// Images
// ============================================================================

/// Image generation request
#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationRequest {
    /// Model
    pub model: String,
    /// Prompt
    pub prompt: String,
    /// `WIDTHxHEIGHT`
    pub size: String,
    /// Number of images
    pub n: u32,
}

/// Image edit request, sent as multipart
#[derive(Debug, Clone)]
pub struct ImageEditRequest {
    /// Model
    pub model: String,
    /// Prompt
    pub prompt: String,
    /// `WIDTHxHEIGHT`
    pub size: String,
    /// Source image bytes (PNG)
    pub image: Vec<u8>,
    /// Source image file name
    pub file_name: String,
}

/// Generated image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageData {
    /// Hosted URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Base64 payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiErrorResponse {
    pub error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    #[serde(default)]
    pub error_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_text_skips_non_text_parts() {
        let message: ThreadMessage = serde_json::from_value(serde_json::json!({
            "id": "msg_1",
            "role": "assistant",
            "content": [
                {"type": "image_file", "image_file": {"file_id": "file-1"}},
                {"type": "text", "text": {"value": "Hello", "annotations": []}}
            ]
        }))
        .unwrap();
        assert_eq!(message.text(), "Hello");
    }

    #[test]
    fn test_unknown_run_status_is_not_terminal() {
        let run: Run =
            serde_json::from_value(serde_json::json!({"id": "run_1", "status": "paused"})).unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_terminal());
    }
}
