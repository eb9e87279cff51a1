// ABOUTME: reqwest implementation of the Assistants API client
// ABOUTME: Adds bearer and beta headers, times each call, and maps error bodies onto AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use super::types::{
    AssistantParams, ChatCompletionRequest, ChatCompletionResponse, DeletionStatus, FileObject,
    ImageData, ImageEditRequest, ImageGenerationRequest, ListResponse, OpenAiErrorResponse,
    RemoteAssistant, Run, Thread, ThreadMessage, VectorStore, VectorStoreFile,
};
use super::AssistantsApi;
use crate::config::OpenAiConfig;
use crate::constants::http;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, warn};

/// Connection timeout for the `OpenAI` API
const CONNECT_TIMEOUT_SECS: u64 = 30;

const SERVICE: &str = "OpenAI";

/// HTTP client for the `OpenAI` REST API
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &OpenAiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    /// Attach bearer token and the Assistants v2 beta header
    fn authorized(&self, request: RequestBuilder) -> AppResult<RequestBuilder> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::new(ErrorCode::ConfigMissing, "OPENAI_API_KEY is not configured")
        })?;
        Ok(request
            .bearer_auth(api_key)
            .header(http::OPENAI_BETA_HEADER, http::OPENAI_BETA_VALUE))
    }

    /// Send a request and decode a JSON success body
    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> AppResult<T> {
        let started = Instant::now();
        let result = self.send_inner(request).await;
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        AppLogger::log_openai_call(operation, result.is_ok(), elapsed);
        let body = result?;

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse {operation} response: {e}");
            AppError::external_service(SERVICE, format!("Failed to parse response: {e}"))
        })
    }

    async fn send_inner(&self, request: RequestBuilder) -> AppResult<String> {
        let response = self.authorized(request)?.send().await.map_err(|e| {
            error!("Failed to send request to OpenAI: {e}");
            AppError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read OpenAI response: {e}");
            AppError::external_service(SERVICE, format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(parse_error_response(status, &body));
        }
        Ok(body)
    }

    async fn delete(&self, operation: &str, endpoint: &str) -> AppResult<()> {
        let status: DeletionStatus = self
            .send(operation, self.client.delete(self.api_url(endpoint)))
            .await?;
        if !status.deleted {
            warn!("OpenAI reported {endpoint} as not deleted");
        }
        Ok(())
    }
}

/// Map an `OpenAI` error response onto an `AppError`
pub(crate) fn parse_error_response(status: StatusCode, body: &str) -> AppError {
    let (message, error_type) = serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
        |_| (body.chars().take(200).collect::<String>(), None),
        |parsed| (parsed.error.message, parsed.error.error_type),
    );

    match status.as_u16() {
        401 | 403 => AppError::new(
            ErrorCode::ExternalAuthFailed,
            format!("OpenAI authentication failed: {message}"),
        ),
        429 => AppError::new(
            ErrorCode::ExternalRateLimited,
            format!("OpenAI rate limit reached: {message}"),
        ),
        400 => AppError::invalid_input(format!("OpenAI rejected the request: {message}")),
        404 => AppError::new(
            ErrorCode::ResourceNotFound,
            format!("OpenAI resource not found: {message}"),
        ),
        code => AppError::external_service(
            SERVICE,
            format!(
                "{code} {} - {message}",
                error_type.as_deref().unwrap_or("unknown")
            ),
        ),
    }
}

#[async_trait]
impl AssistantsApi for OpenAiClient {
    #[instrument(skip(self, params), fields(model = %params.model))]
    async fn create_assistant(&self, params: &AssistantParams) -> AppResult<RemoteAssistant> {
        self.send(
            "assistants.create",
            self.client.post(self.api_url("assistants")).json(params),
        )
        .await
    }

    #[instrument(skip(self, params))]
    async fn update_assistant(
        &self,
        assistant_id: &str,
        params: &AssistantParams,
    ) -> AppResult<RemoteAssistant> {
        self.send(
            "assistants.update",
            self.client
                .post(self.api_url(&format!("assistants/{assistant_id}")))
                .json(params),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_assistant(&self, assistant_id: &str) -> AppResult<()> {
        self.delete("assistants.delete", &format!("assistants/{assistant_id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn create_thread(&self) -> AppResult<Thread> {
        self.send(
            "threads.create",
            self.client.post(self.api_url("threads")).json(&json!({})),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_thread(&self, thread_id: &str) -> AppResult<()> {
        self.delete("threads.delete", &format!("threads/{thread_id}"))
            .await
    }

    #[instrument(skip(self, content), fields(chars = content.len()))]
    async fn create_message(&self, thread_id: &str, content: &str) -> AppResult<ThreadMessage> {
        self.send(
            "messages.create",
            self.client
                .post(self.api_url(&format!("threads/{thread_id}/messages")))
                .json(&json!({ "role": "user", "content": content })),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_messages(&self, thread_id: &str, limit: u32) -> AppResult<Vec<ThreadMessage>> {
        let list: ListResponse<ThreadMessage> = self
            .send(
                "messages.list",
                self.client
                    .get(self.api_url(&format!("threads/{thread_id}/messages")))
                    .query(&[("limit", limit.to_string()), ("order", "desc".to_owned())]),
            )
            .await?;
        Ok(list.data)
    }

    #[instrument(skip(self))]
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> AppResult<Run> {
        self.send(
            "runs.create",
            self.client
                .post(self.api_url(&format!("threads/{thread_id}/runs")))
                .json(&json!({ "assistant_id": assistant_id })),
        )
        .await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> AppResult<Run> {
        self.send(
            "runs.retrieve",
            self.client
                .get(self.api_url(&format!("threads/{thread_id}/runs/{run_id}"))),
        )
        .await
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        mime_type: Option<&str>,
    ) -> AppResult<FileObject> {
        let mut part = Part::bytes(bytes).file_name(file_name.to_owned());
        if let Some(mime) = mime_type {
            part = part
                .mime_str(mime)
                .map_err(|e| AppError::invalid_input(format!("Invalid MIME type: {e}")))?;
        }
        let form = Form::new().text("purpose", "assistants").part("file", part);
        self.send(
            "files.upload",
            self.client.post(self.api_url("files")).multipart(form),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_file(&self, file_id: &str) -> AppResult<()> {
        self.delete("files.delete", &format!("files/{file_id}")).await
    }

    #[instrument(skip(self))]
    async fn create_vector_store(&self, name: &str) -> AppResult<VectorStore> {
        self.send(
            "vector_stores.create",
            self.client
                .post(self.api_url("vector_stores"))
                .json(&json!({ "name": name })),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_vector_store(&self, vector_store_id: &str) -> AppResult<()> {
        self.delete(
            "vector_stores.delete",
            &format!("vector_stores/{vector_store_id}"),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn add_vector_store_file(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> AppResult<VectorStoreFile> {
        self.send(
            "vector_stores.files.create",
            self.client
                .post(self.api_url(&format!("vector_stores/{vector_store_id}/files")))
                .json(&json!({ "file_id": file_id })),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_vector_store_files(
        &self,
        vector_store_id: &str,
    ) -> AppResult<Vec<VectorStoreFile>> {
        let list: ListResponse<VectorStoreFile> = self
            .send(
                "vector_stores.files.list",
                self.client
                    .get(self.api_url(&format!("vector_stores/{vector_store_id}/files"))),
            )
            .await?;
        Ok(list.data)
    }

    #[instrument(skip(self))]
    async fn remove_vector_store_file(&self, vector_store_id: &str, file_id: &str) -> AppResult<()> {
        self.delete(
            "vector_stores.files.delete",
            &format!("vector_stores/{vector_store_id}/files/{file_id}"),
        )
        .await
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn chat_completion(&self, request: &ChatCompletionRequest) -> AppResult<String> {
        let response: ChatCompletionResponse = self
            .send(
                "chat.completions",
                self.client
                    .post(self.api_url("chat/completions"))
                    .json(request),
            )
            .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::external_service(SERVICE, "API returned no choices"))?;
        debug!("Chat completion returned {} chars", content.len());
        Ok(content)
    }

    #[instrument(skip(self, request), fields(model = %request.model, size = %request.size))]
    async fn generate_image(&self, request: &ImageGenerationRequest) -> AppResult<Vec<ImageData>> {
        let list: ListResponse<ImageData> = self
            .send(
                "images.generate",
                self.client
                    .post(self.api_url("images/generations"))
                    .json(request),
            )
            .await?;
        Ok(list.data)
    }

    #[instrument(skip(self, request), fields(model = %request.model, size = %request.size))]
    async fn edit_image(&self, request: ImageEditRequest) -> AppResult<Vec<ImageData>> {
        let image = Part::bytes(request.image)
            .file_name(request.file_name)
            .mime_str("image/png")
            .map_err(|e| AppError::internal(format!("Invalid MIME type: {e}")))?;
        let form = Form::new()
            .text("model", request.model)
            .text("prompt", request.prompt)
            .text("size", request.size)
            .text("n", "1")
            .part("image", image);

        let list: ListResponse<ImageData> = self
            .send(
                "images.edit",
                self.client.post(self.api_url("images/edits")).multipart(form),
            )
            .await?;
        Ok(list.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_response_maps_status_codes() {
        let body = r#"{"error":{"message":"bad key","type":"invalid_request_error"}}"#;
        assert_eq!(
            parse_error_response(StatusCode::UNAUTHORIZED, body).code,
            ErrorCode::ExternalAuthFailed
        );
        assert_eq!(
            parse_error_response(StatusCode::TOO_MANY_REQUESTS, body).code,
            ErrorCode::ExternalRateLimited
        );
        assert_eq!(
            parse_error_response(StatusCode::BAD_REQUEST, body).code,
            ErrorCode::InvalidInput
        );
        assert_eq!(
            parse_error_response(StatusCode::NOT_FOUND, body).code,
            ErrorCode::ResourceNotFound
        );
        let other = parse_error_response(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded");
        assert_eq!(other.code, ErrorCode::ExternalServiceError);
        assert!(other.message.contains("upstream exploded"));
    }
}
