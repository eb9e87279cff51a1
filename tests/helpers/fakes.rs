// ABOUTME: In-process fakes of the OpenAI, Google Docs and messenger clients
// ABOUTME: Record calls and return scripted responses so route tests run offline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use airlab_assistant_builder::channels::ChannelClient;
use airlab_assistant_builder::errors::{AppError, AppResult};
use airlab_assistant_builder::models::Integration;
use airlab_assistant_builder::openai::types::{FileCounts, MessageContent, TextContent};
use airlab_assistant_builder::openai::{
    AssistantParams, AssistantsApi, ChatCompletionRequest, FileObject, ImageData,
    ImageEditRequest, ImageGenerationRequest, RemoteAssistant, Run, RunError, RunStatus, Thread,
    ThreadMessage, VectorStore, VectorStoreFile,
};
use airlab_assistant_builder::services::google_docs::{DocumentFetcher, FetchedDocument};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Scripted stand-in for the `OpenAI` Assistants API
pub struct FakeAssistantsApi {
    next_id: AtomicU64,
    calls: Mutex<Vec<String>>,
    run_statuses: Mutex<VecDeque<RunStatus>>,
    reply: Mutex<String>,
    chat_reply: Mutex<Option<String>>,
    fail_deletes: AtomicBool,
    fail_create_assistant: AtomicBool,
    fail_updates: AtomicBool,
    fail_attach: AtomicBool,
    vector_store_files: Mutex<HashMap<String, Vec<String>>>,
}

impl Default for FakeAssistantsApi {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            calls: Mutex::new(Vec::new()),
            run_statuses: Mutex::new(VecDeque::new()),
            reply: Mutex::new("Hello from the assistant".to_owned()),
            chat_reply: Mutex::new(Some("Summary of the document".to_owned())),
            fail_deletes: AtomicBool::new(false),
            fail_create_assistant: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
            fail_attach: AtomicBool::new(false),
            vector_store_files: Mutex::new(HashMap::new()),
        }
    }
}

impl FakeAssistantsApi {
    fn id(&self, prefix: &str) -> String {
        format!("{prefix}_{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn upstream_failure() -> AppError {
        AppError::external_service("OpenAI", "service unavailable")
    }

    /// Every call made so far, formatted as `operation:argument`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether a call starting with `prefix` was made
    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    /// Statuses returned by successive `retrieve_run` calls; `completed` once exhausted
    pub fn script_run_statuses(&self, statuses: &[RunStatus]) {
        self.run_statuses
            .lock()
            .unwrap()
            .extend(statuses.iter().copied());
    }

    /// Text of the assistant reply appended after each run
    pub fn set_reply(&self, reply: &str) {
        *self.reply.lock().unwrap() = reply.to_owned();
    }

    /// Reply of chat completions, `None` making them fail
    pub fn set_chat_reply(&self, reply: Option<&str>) {
        *self.chat_reply.lock().unwrap() = reply.map(str::to_owned);
    }

    /// Make every delete operation fail
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    /// Make assistant creation fail
    pub fn fail_create_assistant(&self) {
        self.fail_create_assistant.store(true, Ordering::SeqCst);
    }

    /// Make assistant updates fail
    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    /// Make attaching files to a vector store fail
    pub fn fail_attach(&self) {
        self.fail_attach.store(true, Ordering::SeqCst);
    }

    fn delete_result(&self) -> AppResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            Err(Self::upstream_failure())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AssistantsApi for FakeAssistantsApi {
    async fn create_assistant(&self, params: &AssistantParams) -> AppResult<RemoteAssistant> {
        self.record(format!("create_assistant:{}", params.model));
        if self.fail_create_assistant.load(Ordering::SeqCst) {
            return Err(Self::upstream_failure());
        }
        Ok(RemoteAssistant {
            id: self.id("asst"),
            model: params.model.clone(),
        })
    }

    async fn update_assistant(
        &self,
        assistant_id: &str,
        params: &AssistantParams,
    ) -> AppResult<RemoteAssistant> {
        self.record(format!("update_assistant:{assistant_id}"));
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(Self::upstream_failure());
        }
        Ok(RemoteAssistant {
            id: assistant_id.to_owned(),
            model: params.model.clone(),
        })
    }

    async fn delete_assistant(&self, assistant_id: &str) -> AppResult<()> {
        self.record(format!("delete_assistant:{assistant_id}"));
        self.delete_result()
    }

    async fn create_thread(&self) -> AppResult<Thread> {
        self.record("create_thread");
        Ok(Thread {
            id: self.id("thread"),
        })
    }

    async fn delete_thread(&self, thread_id: &str) -> AppResult<()> {
        self.record(format!("delete_thread:{thread_id}"));
        self.delete_result()
    }

    async fn create_message(&self, thread_id: &str, content: &str) -> AppResult<ThreadMessage> {
        self.record(format!("create_message:{thread_id}"));
        Ok(ThreadMessage {
            id: self.id("msg"),
            role: "user".to_owned(),
            content: vec![MessageContent::Text {
                text: TextContent {
                    value: content.to_owned(),
                },
            }],
            run_id: None,
            created_at: 0,
        })
    }

    async fn list_messages(&self, thread_id: &str, _limit: u32) -> AppResult<Vec<ThreadMessage>> {
        self.record(format!("list_messages:{thread_id}"));
        Ok(vec![ThreadMessage {
            id: self.id("msg"),
            role: "assistant".to_owned(),
            content: vec![MessageContent::Text {
                text: TextContent {
                    value: self.reply.lock().unwrap().clone(),
                },
            }],
            run_id: None,
            created_at: 0,
        }])
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> AppResult<Run> {
        self.record(format!("create_run:{thread_id}:{assistant_id}"));
        Ok(Run {
            id: self.id("run"),
            status: RunStatus::Queued,
            last_error: None,
        })
    }

    async fn retrieve_run(&self, _thread_id: &str, run_id: &str) -> AppResult<Run> {
        self.record(format!("retrieve_run:{run_id}"));
        let status = self
            .run_statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(RunStatus::Completed);
        Ok(Run {
            id: run_id.to_owned(),
            status,
            last_error: (status == RunStatus::Failed).then(|| RunError {
                code: Some("server_error".to_owned()),
                message: "The run failed".to_owned(),
            }),
        })
    }

    async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        _mime_type: Option<&str>,
    ) -> AppResult<FileObject> {
        self.record(format!("upload_file:{file_name}"));
        Ok(FileObject {
            id: self.id("file"),
            filename: file_name.to_owned(),
            bytes: i64::try_from(bytes.len()).unwrap(),
        })
    }

    async fn delete_file(&self, file_id: &str) -> AppResult<()> {
        self.record(format!("delete_file:{file_id}"));
        self.delete_result()
    }

    async fn create_vector_store(&self, name: &str) -> AppResult<VectorStore> {
        self.record(format!("create_vector_store:{name}"));
        Ok(VectorStore {
            id: self.id("vs"),
            name: Some(name.to_owned()),
            file_counts: FileCounts::default(),
        })
    }

    async fn delete_vector_store(&self, vector_store_id: &str) -> AppResult<()> {
        self.record(format!("delete_vector_store:{vector_store_id}"));
        self.delete_result()
    }

    async fn add_vector_store_file(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> AppResult<VectorStoreFile> {
        self.record(format!("add_vector_store_file:{vector_store_id}:{file_id}"));
        if self.fail_attach.load(Ordering::SeqCst) {
            return Err(Self::upstream_failure());
        }
        self.vector_store_files
            .lock()
            .unwrap()
            .entry(vector_store_id.to_owned())
            .or_default()
            .push(file_id.to_owned());
        Ok(VectorStoreFile {
            id: file_id.to_owned(),
            status: "completed".to_owned(),
        })
    }

    async fn list_vector_store_files(
        &self,
        vector_store_id: &str,
    ) -> AppResult<Vec<VectorStoreFile>> {
        self.record(format!("list_vector_store_files:{vector_store_id}"));
        Ok(self
            .vector_store_files
            .lock()
            .unwrap()
            .get(vector_store_id)
            .map(|ids| {
                ids.iter()
                    .map(|id| VectorStoreFile {
                        id: id.clone(),
                        status: "completed".to_owned(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn remove_vector_store_file(&self, vector_store_id: &str, file_id: &str) -> AppResult<()> {
        self.record(format!("remove_vector_store_file:{vector_store_id}:{file_id}"));
        if let Some(ids) = self.vector_store_files.lock().unwrap().get_mut(vector_store_id) {
            ids.retain(|id| id != file_id);
        }
        self.delete_result()
    }

    async fn chat_completion(&self, request: &ChatCompletionRequest) -> AppResult<String> {
        self.record(format!("chat_completion:{}", request.model));
        self.chat_reply
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(Self::upstream_failure)
    }

    async fn generate_image(&self, request: &ImageGenerationRequest) -> AppResult<Vec<ImageData>> {
        self.record(format!("generate_image:{}", request.size));
        Ok(vec![ImageData {
            url: Some("https://images.example.com/generated.png".to_owned()),
            b64_json: None,
        }])
    }

    async fn edit_image(&self, request: ImageEditRequest) -> AppResult<Vec<ImageData>> {
        self.record(format!("edit_image:{}", request.file_name));
        Ok(vec![ImageData {
            url: Some("https://images.example.com/edited.png".to_owned()),
            b64_json: None,
        }])
    }
}

/// Google Docs fetcher serving fixed exports
#[derive(Default)]
pub struct FakeDocumentFetcher {
    exports: Mutex<HashMap<String, FetchedDocument>>,
}

impl FakeDocumentFetcher {
    /// Serve `body` for the given export format (`txt` or `html`)
    pub fn serve(&self, format: &str, content_type: &str, body: &str) {
        self.exports.lock().unwrap().insert(
            format.to_owned(),
            FetchedDocument {
                content_type: Some(content_type.to_owned()),
                body: body.to_owned(),
            },
        );
    }
}

#[async_trait]
impl DocumentFetcher for FakeDocumentFetcher {
    async fn fetch_export(&self, _document_id: &str, format: &str) -> AppResult<FetchedDocument> {
        self.exports
            .lock()
            .unwrap()
            .get(format)
            .cloned()
            .ok_or_else(|| AppError::external_service("Google Docs", "export not available"))
    }
}

/// Message delivered through a messenger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Channel of the integration
    pub channel: String,
    /// Recipient chat
    pub chat_id: String,
    /// Text sent
    pub text: String,
}

/// Channel client recording outgoing messages
#[derive(Default)]
pub struct RecordingChannelClient {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingChannelClient {
    /// Messages sent so far
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelClient for RecordingChannelClient {
    async fn send_text(
        &self,
        integration: &Integration,
        chat_id: &str,
        text: &str,
    ) -> AppResult<()> {
        self.sent.lock().unwrap().push(SentMessage {
            channel: integration.channel.to_string(),
            chat_id: chat_id.to_owned(),
            text: text.to_owned(),
        });
        Ok(())
    }
}
