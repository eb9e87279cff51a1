// ABOUTME: Request authentication from an Authorization header or the session cookie
// ABOUTME: Resolves the token to an active user and session through the AuthManager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::auth::AuthContext;
use crate::constants::http::SESSION_COOKIE;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use axum::http::{header, HeaderMap};

/// Read a cookie value from the `Cookie` headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_owned())
        .filter(|value| !value.is_empty())
}

/// Extract the raw session token from a request
///
/// The `Authorization: Bearer` header wins over the cookie.
///
/// # Errors
///
/// Returns `AUTH_REQUIRED` when neither is present and `AUTH_INVALID` for a
/// malformed `Authorization` header
pub fn extract_token(headers: &HeaderMap) -> AppResult<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| AppError::auth_invalid("Malformed authorization header"))?;
        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| AppError::auth_invalid("Authorization header must use Bearer scheme"));
    }
    get_cookie_value(headers, SESSION_COOKIE).ok_or_else(AppError::auth_required)
}

/// Authenticate a request
///
/// # Errors
///
/// Any error from [`extract_token`] or [`crate::auth::AuthManager::authenticate`]
pub async fn authenticate(
    headers: &HeaderMap,
    resources: &ServerResources,
) -> AppResult<AuthContext> {
    let token = extract_token(headers)?;
    resources
        .auth
        .authenticate(&resources.database, &token)
        .await
}
