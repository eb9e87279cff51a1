// ABOUTME: HTTP server assembly: merges domain routers and applies the middleware stack
// ABOUTME: Also bootstraps the configured admin account and serves with graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::database_plugins::shared::validation::{validate_email, validate_password};
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::middleware::{log_requests, setup_cors, widget_cors};
use crate::models::{User, UserRole};
use crate::resources::ServerResources;
use crate::routes::{
    AdminRoutes, AssistantRoutes, AuthRoutes, ConversationRoutes, GoogleDocsRoutes,
    HealthRoutes, ImageRoutes, IntegrationRoutes, KnowledgeBaseRoutes, ObjectRoutes, UserRoutes,
    VectorStoreRoutes, WebhookRoutes, WidgetRoutes,
};
use axum::{extract::DefaultBodyLimit, middleware, Router};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Whole-request timeout, above the worst-case run poll
const REQUEST_TIMEOUT_SECS: u64 = 180;

/// Room for multipart boundaries and text fields on top of the file limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the complete application router
///
/// The widget router carries its own any-origin CORS layer; every other
/// route follows the configured origin list.
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let body_limit = resources.config.storage.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    let api = Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(UserRoutes::routes(resources.clone()))
        .merge(AssistantRoutes::routes(resources.clone()))
        .merge(ConversationRoutes::routes(resources.clone()))
        .merge(KnowledgeBaseRoutes::routes(resources.clone()))
        .merge(GoogleDocsRoutes::routes(resources.clone()))
        .merge(VectorStoreRoutes::routes(resources.clone()))
        .merge(ObjectRoutes::routes(resources.clone()))
        .merge(IntegrationRoutes::routes(resources.clone()))
        .merge(WebhookRoutes::routes(resources.clone()))
        .merge(ImageRoutes::routes(resources.clone()))
        .merge(AdminRoutes::routes(resources.clone()))
        .layer(setup_cors(&resources.config));
    let widget = WidgetRoutes::routes(resources).layer(widget_cors());

    Router::new()
        .merge(api)
        .merge(widget)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_requests))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(TraceLayer::new_for_http())
}

/// Create the configured admin account when it does not exist yet
///
/// An existing account with that email is promoted to admin.
///
/// # Errors
///
/// Returns an error for invalid bootstrap credentials or database failures
pub async fn bootstrap_admin(resources: &ServerResources) -> AppResult<()> {
    let auth_config = &resources.config.auth;
    let (Some(email), Some(password)) = (
        auth_config.bootstrap_admin_email.as_deref(),
        auth_config.bootstrap_admin_password.as_deref(),
    ) else {
        return Ok(());
    };
    let email = email.trim().to_lowercase();
    validate_email(&email)?;
    validate_password(password)?;

    if let Some(existing) = resources.database.get_user_by_email(&email).await? {
        if !existing.role.is_admin() {
            resources
                .database
                .update_user_status(existing.id, UserRole::Admin, existing.is_active)
                .await?;
            warn!(user_id = %existing.id, "Promoted existing account to admin");
        }
        return Ok(());
    }

    let password_hash = resources.auth.hash_password(password).await?;
    let mut admin = User::new(email, password_hash, Some("Administrator".to_owned()));
    admin.role = UserRole::Admin;
    resources.database.create_user(&admin).await?;
    info!(user_id = %admin.id, "Created bootstrap admin account");
    Ok(())
}

/// Remove expired sessions left over from previous runs
///
/// # Errors
///
/// Returns an error if the delete fails
pub async fn purge_expired_sessions(resources: &ServerResources) -> AppResult<u64> {
    let purged = resources
        .database
        .purge_expired_sessions(Utc::now())
        .await?;
    if purged > 0 {
        info!(purged, "Purged expired sessions");
    }
    Ok(purged)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Bind and serve until Ctrl-C
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> AppResult<()> {
    let addr = format!(
        "{}:{}",
        resources.config.host, resources.config.http_port
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::config(format!("Failed to bind {addr}: {e}")))?;
    info!("HTTP server listening on http://{addr}");

    axum::serve(listener, build_router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("HTTP server error: {e}")))
}
