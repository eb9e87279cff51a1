// ABOUTME: Access-log middleware recording method, path, status and latency per request
// ABOUTME: Complements the tower-http TraceLayer with one structured line per response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::logging::AppLogger;
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Log every request once its response is ready
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    // Webhook paths carry secrets in the last segment
    let path = redact_path(request.uri().path());
    let started = Instant::now();

    let response = next.run(request).await;

    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    AppLogger::log_api_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        duration_ms,
        None,
    );
    response
}

fn redact_path(path: &str) -> String {
    if !path.starts_with("/webhooks/") {
        return path.to_owned();
    }
    let mut segments: Vec<&str> = path.split('/').collect();
    if segments.len() > 4 {
        if let Some(last) = segments.last_mut() {
            *last = "***";
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_secret_redacted() {
        assert_eq!(
            redact_path("/webhooks/telegram/1234/s3cret"),
            "/webhooks/telegram/1234/***"
        );
        assert_eq!(redact_path("/api/assistants"), "/api/assistants");
    }
}
