// ABOUTME: OpenAI Assistants API abstraction used by every assistant-facing feature
// ABOUTME: Defines the AssistantsApi trait, the reqwest client, wire types, and run polling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! # `OpenAI` Integration
//!
//! Route handlers and services depend on [`AssistantsApi`] rather than the
//! concrete [`OpenAiClient`], so tests can substitute an in-process fake.

use crate::errors::AppResult;
use async_trait::async_trait;

/// reqwest-backed client
pub mod client;
/// Bounded run polling
pub mod run_poller;
/// Request and response types
pub mod types;

pub use client::OpenAiClient;
pub use run_poller::wait_for_run;
pub use types::{
    AssistantParams, ChatCompletionRequest, ChatMessage, FileObject, ImageData, ImageEditRequest,
    ImageGenerationRequest, RemoteAssistant, Run, RunError, RunStatus, Thread, ThreadMessage,
    ToolResources, VectorStore, VectorStoreFile,
};

/// Operations the server performs against the `OpenAI` REST API
#[async_trait]
pub trait AssistantsApi: Send + Sync {
    /// Create an assistant
    async fn create_assistant(&self, params: &AssistantParams) -> AppResult<RemoteAssistant>;

    /// Modify an existing assistant
    async fn update_assistant(
        &self,
        assistant_id: &str,
        params: &AssistantParams,
    ) -> AppResult<RemoteAssistant>;

    /// Delete an assistant
    async fn delete_assistant(&self, assistant_id: &str) -> AppResult<()>;

    /// Create an empty thread
    async fn create_thread(&self) -> AppResult<Thread>;

    /// Delete a thread
    async fn delete_thread(&self, thread_id: &str) -> AppResult<()>;

    /// Append a user message to a thread
    async fn create_message(&self, thread_id: &str, content: &str) -> AppResult<ThreadMessage>;

    /// Newest messages of a thread first
    async fn list_messages(&self, thread_id: &str, limit: u32) -> AppResult<Vec<ThreadMessage>>;

    /// Start a run of `assistant_id` on a thread
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> AppResult<Run>;

    /// Fetch the current state of a run
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> AppResult<Run>;

    /// Upload a file with `purpose=assistants`
    async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        mime_type: Option<&str>,
    ) -> AppResult<FileObject>;

    /// Delete an uploaded file
    async fn delete_file(&self, file_id: &str) -> AppResult<()>;

    /// Create a vector store
    async fn create_vector_store(&self, name: &str) -> AppResult<VectorStore>;

    /// Delete a vector store
    async fn delete_vector_store(&self, vector_store_id: &str) -> AppResult<()>;

    /// Attach an uploaded file to a vector store
    async fn add_vector_store_file(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> AppResult<VectorStoreFile>;

    /// List files of a vector store
    async fn list_vector_store_files(&self, vector_store_id: &str)
        -> AppResult<Vec<VectorStoreFile>>;

    /// Detach a file from a vector store
    async fn remove_vector_store_file(&self, vector_store_id: &str, file_id: &str)
        -> AppResult<()>;

    /// Run a chat completion and return the first choice's text
    async fn chat_completion(&self, request: &ChatCompletionRequest) -> AppResult<String>;

    /// Generate images from a prompt
    async fn generate_image(&self, request: &ImageGenerationRequest) -> AppResult<Vec<ImageData>>;

    /// Edit an image with a prompt
    async fn edit_image(&self, request: ImageEditRequest) -> AppResult<Vec<ImageData>>;
}
