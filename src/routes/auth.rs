// ABOUTME: Authentication route handlers for registration, login, logout and the current user
// ABOUTME: Issues session tokens both in the JSON body and as an HttpOnly cookie
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! Authentication routes
//!
//! Login creates a session row and returns a signed token. Browsers receive
//! the same token in the `airlab_session` cookie; API clients send it as a
//! bearer token.

use crate::constants::http::SESSION_COOKIE;
use crate::database_plugins::shared::validation::{validate_email, validate_password};
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::middleware::authenticate;
use crate::models::{Session, User};
use crate::resources::ServerResources;
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
    /// Optional display name
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Issued session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Bearer token, also set as cookie
    pub token: String,
    /// Session expiry (RFC 3339)
    pub expires_at: String,
    /// Authenticated user
    pub user: User,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/logout", post(Self::handle_logout))
            .route("/api/auth/me", get(Self::handle_me))
            .with_state(resources)
    }

    fn session_cookie(
        resources: &ServerResources,
        token: &str,
        max_age_secs: i64,
    ) -> AppResult<HeaderValue> {
        let secure = if resources.config.environment.is_production() {
            "; Secure"
        } else {
            ""
        };
        HeaderValue::from_str(&format!(
            "{SESSION_COOKIE}={token}; HttpOnly{secure}; Path=/; SameSite=Lax; Max-Age={max_age_secs}"
        ))
        .map_err(|e| AppError::internal(format!("Invalid cookie value: {e}")))
    }

    async fn issue_session(
        resources: &ServerResources,
        user: User,
        headers: &HeaderMap,
        status: StatusCode,
    ) -> AppResult<Response> {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let (token, session): (String, Session) = resources
            .auth
            .login(&resources.database, &user, user_agent)
            .await?;
        resources.database.update_last_active(user.id).await?;

        let cookie =
            Self::session_cookie(resources, &token, resources.auth.session_ttl_hours() * 3600)?;
        let body = SessionResponse {
            token,
            expires_at: session.expires_at.to_rfc3339(),
            user,
        };
        Ok((status, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
    }

    /// Create an account and sign it in
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let email = request.email.trim().to_lowercase();
        validate_email(&email)?;
        validate_password(&request.password)?;

        if resources.database.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::already_exists(
                "An account with this email already exists",
            ));
        }

        let password_hash = resources.auth.hash_password(&request.password).await?;
        let display_name = request
            .display_name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());
        let user = User::new(email, password_hash, display_name);
        resources.database.create_user(&user).await?;
        info!(user_id = %user.id, "Registered user");
        AppLogger::log_auth_event(&user.id.to_string(), "register", true, None);

        Self::issue_session(&resources, user, &headers, StatusCode::CREATED).await
    }

    /// Exchange credentials for a session
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let email = request.email.trim().to_lowercase();
        let invalid = || AppError::auth_invalid("Invalid email or password");

        let Some(user) = resources.database.get_user_by_email(&email).await? else {
            AppLogger::log_auth_event("unknown", "login", false, Some("unknown email"));
            return Err(invalid());
        };
        if !resources
            .auth
            .verify_password(&request.password, &user.password_hash)
            .await
        {
            AppLogger::log_auth_event(&user.id.to_string(), "login", false, Some("bad password"));
            return Err(invalid());
        }
        if !user.is_active {
            AppLogger::log_auth_event(&user.id.to_string(), "login", false, Some("inactive"));
            return Err(AppError::new(
                ErrorCode::PermissionDenied,
                "Account is deactivated",
            ));
        }

        AppLogger::log_auth_event(&user.id.to_string(), "login", true, None);
        Self::issue_session(&resources, user, &headers, StatusCode::OK).await
    }

    /// Revoke the current session and clear the cookie
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        resources
            .auth
            .logout(&resources.database, auth.session_id)
            .await?;
        AppLogger::log_auth_event(&auth.user_id().to_string(), "logout", true, None);

        let cookie = Self::session_cookie(&resources, "", 0)?;
        Ok((
            StatusCode::OK,
            [(header::SET_COOKIE, cookie)],
            Json(serde_json::json!({ "success": true })),
        )
            .into_response())
    }

    /// Current user
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        Ok((StatusCode::OK, Json(auth.user)).into_response())
    }
}
