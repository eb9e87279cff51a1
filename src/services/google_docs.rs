// ABOUTME: Google Docs import pipeline from public export URL to the assistant's vector store
// ABOUTME: Fetches text (HTML export stripped as fallback), summarizes it, and indexes the result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! # Google Docs Import
//!
//! 1. `GET /document/d/<id>/export?format=txt`; on failure or an HTML body,
//!    `?format=html` with markup stripped
//! 2. summarize the text with a chat completion, falling back to the raw text
//! 3. upload the result as `<title>.txt` and attach it to the vector store

use crate::constants::limits;
use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Assistant, DocumentStatus, GoogleDocsDocument};
use crate::openai::{AssistantsApi, ChatCompletionRequest, ChatMessage};
use crate::services::knowledge::attach_file;
use crate::storage::sanitize_file_name;
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Public Google Docs host
pub const GOOGLE_DOCS_BASE_URL: &str = "https://docs.google.com";

const SUMMARY_PROMPT: &str = "You prepare documents for a customer-support assistant's knowledge base. \
Rewrite the document below as a well-structured, factual summary. Keep every product, price, \
contact detail, policy and procedure. Do not invent information. Answer in the document's language.";

/// Output token cap of the summary
const SUMMARY_MAX_TOKENS: u32 = 4_000;

static DOC_URL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"/document/(?:u/\d+/)?d/([A-Za-z0-9_-]+)").ok());

static BARE_ID_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{20,}$").ok());

static SCRIPT_STYLE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style|head)\b[^>]*>.*?</(script|style|head)>").ok());

static BLOCK_END_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|tr|table|ul|ol|title)>").ok()
});

static TAG_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").ok());

static TITLE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok());

/// Body of a fetched export
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// `Content-Type` header
    pub content_type: Option<String>,
    /// Response body
    pub body: String,
}

impl FetchedDocument {
    /// Whether the body is an HTML page rather than plain text
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("text/html"))
            || looks_like_html(&self.body)
    }
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(256).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Fetches Google Docs exports
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch an export of `document_id` in `format` (`txt` or `html`)
    async fn fetch_export(&self, document_id: &str, format: &str) -> AppResult<FetchedDocument>;
}

/// reqwest-backed fetcher for public documents
#[derive(Clone)]
pub struct HttpDocumentFetcher {
    client: Client,
    base_url: String,
}

impl HttpDocumentFetcher {
    /// Create a fetcher against `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(base_url: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(limits::UPSTREAM_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch_export(&self, document_id: &str, format: &str) -> AppResult<FetchedDocument> {
        let url = format!("{}/document/d/{document_id}/export", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("format", format)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(
                "Google Docs",
                format!("Export returned {status}; is the document shared publicly?"),
            ));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await?;
        Ok(FetchedDocument { content_type, body })
    }
}

/// Extract the document ID from a Google Docs URL or accept a bare ID
///
/// # Errors
///
/// Returns `INVALID_INPUT` when no document ID can be found
pub fn parse_document_id(input: &str) -> AppResult<String> {
    let input = input.trim();
    if let Some(captures) = DOC_URL_PATTERN
        .as_ref()
        .and_then(|re| re.captures(input))
    {
        if let Some(id) = captures.get(1) {
            return Ok(id.as_str().to_owned());
        }
    }
    if BARE_ID_PATTERN
        .as_ref()
        .is_some_and(|re| re.is_match(input))
    {
        return Ok(input.to_owned());
    }
    Err(AppError::invalid_input(
        "Expected a docs.google.com/document/d/<id> URL or a document ID",
    ))
}

/// Reduce an HTML page to readable text
///
/// Drops `script`, `style` and `head` blocks, turns block ends into line
/// breaks, removes remaining tags, decodes entities and collapses whitespace.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let text = replace_all(&SCRIPT_STYLE_PATTERN, html, " ");
    let text = replace_all(&BLOCK_END_PATTERN, &text, "\n");
    let text = replace_all(&TAG_PATTERN, &text, " ");
    collapse_whitespace(&html_escape::decode_html_entities(&text))
}

fn replace_all(pattern: &LazyLock<Option<Regex>>, text: &str, replacement: &str) -> String {
    pattern.as_ref().map_or_else(
        || text.to_owned(),
        |re| re.replace_all(text, replacement).into_owned(),
    )
}

/// Collapse runs of spaces within lines and drop blank lines
fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<title>` of an HTML page
fn html_title(html: &str) -> Option<String> {
    TITLE_PATTERN
        .as_ref()
        .and_then(|re| re.captures(html))
        .and_then(|c| c.get(1))
        .map(|m| collapse_whitespace(&html_escape::decode_html_entities(m.as_str())))
        .map(|t| t.trim_end_matches(" - Google Docs").trim().to_owned())
        .filter(|t| !t.is_empty())
}

/// Text of a document and the title found while fetching it
#[derive(Debug, Clone)]
pub struct DocumentText {
    /// Extracted plain text
    pub text: String,
    /// Title from the HTML export or the first line
    pub title: String,
}

/// Fetch the text of a document, preferring the plain-text export
///
/// # Errors
///
/// Returns the HTML fetch error when both exports fail, and
/// `UNPROCESSABLE_CONTENT` when the document has no text
pub async fn fetch_document_text(
    fetcher: &dyn DocumentFetcher,
    document_id: &str,
) -> AppResult<DocumentText> {
    let mut title = None;
    let text = match fetcher.fetch_export(document_id, "txt").await {
        Ok(doc) if !doc.is_html() => doc.body.trim_start_matches('\u{feff}').trim().to_owned(),
        Ok(_) | Err(_) => {
            info!(document_id, "Plain text export unavailable, falling back to HTML");
            let doc = fetcher.fetch_export(document_id, "html").await?;
            title = html_title(&doc.body);
            strip_html(&doc.body)
        }
    };

    if text.trim().is_empty() {
        return Err(AppError::new(
            ErrorCode::UnprocessableContent,
            "The document contains no text",
        ));
    }

    let title = title.unwrap_or_else(|| {
        text.lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("Google Doc")
            .chars()
            .take(100)
            .collect()
    });
    Ok(DocumentText { text, title })
}

/// Summarize document text, returning `None` if the model call fails
pub async fn summarize(api: &dyn AssistantsApi, model: &str, text: &str) -> Option<String> {
    let input: String = text.chars().take(limits::MAX_SUMMARY_INPUT_CHARS).collect();
    let request = ChatCompletionRequest {
        model: model.to_owned(),
        messages: vec![ChatMessage::system(SUMMARY_PROMPT), ChatMessage::user(input)],
        temperature: Some(0.3),
        max_tokens: Some(SUMMARY_MAX_TOKENS),
        response_format: None,
    };
    match api.chat_completion(&request).await {
        Ok(summary) if !summary.trim().is_empty() => Some(summary),
        Ok(_) => {
            warn!("Summarization returned empty text");
            None
        }
        Err(e) => {
            warn!("Summarization failed, using raw text: {e}");
            None
        }
    }
}

/// Import a Google Doc into the assistant's knowledge base
///
/// The document row is always persisted; indexing failures mark it `failed`.
///
/// # Errors
///
/// `INVALID_INPUT` for unparseable URLs, fetch errors, `UNPROCESSABLE_CONTENT`
/// for empty documents, and database errors
pub async fn import_document(
    database: &Database,
    api: &dyn AssistantsApi,
    fetcher: &dyn DocumentFetcher,
    summary_model: &str,
    assistant: &mut Assistant,
    url: &str,
) -> AppResult<GoogleDocsDocument> {
    let document_id = parse_document_id(url)?;
    let fetched = fetch_document_text(fetcher, &document_id).await?;
    let raw_length = i64::try_from(fetched.text.chars().count()).unwrap_or(i64::MAX);

    let content = summarize(api, summary_model, &fetched.text)
        .await
        .unwrap_or_else(|| {
            fetched
                .text
                .chars()
                .take(limits::MAX_SUMMARY_INPUT_CHARS)
                .collect()
        });

    let now = Utc::now();
    let mut document = GoogleDocsDocument {
        id: Uuid::new_v4(),
        user_id: assistant.user_id,
        assistant_id: assistant.id,
        document_id,
        url: url.trim().to_owned(),
        title: fetched.title,
        summary: Some(content.clone()),
        raw_length,
        openai_file_id: None,
        vector_store_id: None,
        status: DocumentStatus::Pending,
        error: None,
        created_at: now,
        updated_at: now,
    };
    database.create_google_doc(&document).await?;

    let file_name = format!("{}.txt", sanitize_file_name(&document.title));
    match attach_file(
        database,
        api,
        assistant,
        &file_name,
        content.into_bytes(),
        Some("text/plain"),
    )
    .await
    {
        Ok((file, vector_store_id)) => {
            document.openai_file_id = Some(file.id);
            document.vector_store_id = Some(vector_store_id);
            document.status = DocumentStatus::Processed;
            info!(document_id = %document.document_id, "Imported Google Doc");
        }
        Err(e) => {
            warn!(document_id = %document.document_id, "Google Doc indexing failed: {e}");
            document.status = DocumentStatus::Failed;
            document.error = Some(e.message);
        }
    }
    document.updated_at = Utc::now();
    database.update_google_doc(&document).await?;
    Ok(document)
}

/// Delete an imported document with best-effort `OpenAI` cleanup
///
/// # Errors
///
/// Returns an error only if the database delete fails
pub async fn remove_document(
    database: &Database,
    api: &dyn AssistantsApi,
    document: &GoogleDocsDocument,
) -> AppResult<()> {
    if let Some(file_id) = document.openai_file_id.as_deref() {
        if let Some(vector_store_id) = document.vector_store_id.as_deref() {
            if let Err(e) = api.remove_vector_store_file(vector_store_id, file_id).await {
                warn!(file_id, "Failed to detach document from vector store: {e}");
            }
        }
        if let Err(e) = api.delete_file(file_id).await {
            warn!(file_id, "Failed to delete document file: {e}");
        }
    }
    database.delete_google_doc(document.id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_id() {
        assert_eq!(
            parse_document_id("https://docs.google.com/document/d/1AbC_def-GHI/edit?usp=sharing")
                .unwrap(),
            "1AbC_def-GHI"
        );
        assert_eq!(
            parse_document_id("1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms").unwrap(),
            "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms"
        );
        assert!(parse_document_id("https://example.com/page").is_err());
    }

    #[test]
    fn test_strip_html() {
        let html = "<html><head><title>Menu - Google Docs</title><style>p{color:red}</style></head>\
            <body><script>alert(1)</script><h1>Caf&eacute;   Menu</h1><p>Tea &amp; coffee</p>\
            <p>Open   9&ndash;5</p></body></html>";
        assert_eq!(strip_html(html), "Café Menu\nTea & coffee\nOpen 9–5");
        assert_eq!(html_title(html).as_deref(), Some("Menu"));
    }
}
