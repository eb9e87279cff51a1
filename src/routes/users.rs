// ABOUTME: Current-user route handlers for profile updates, account deletion and billing
// ABOUTME: Plan changes debit the prepaid balance and answer 402 when it is insufficient
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::database_plugins::shared::validation::validate_password;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::middleware::authenticate;
use crate::models::{BillingPlan, User};
use crate::resources::ServerResources;
use crate::services::accounts::{self, BillingSummary};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Profile update, every field optional
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name
    pub display_name: Option<String>,
    /// New password
    pub password: Option<String>,
}

/// Plan switch request
#[derive(Debug, Deserialize)]
pub struct ChangePlanRequest {
    /// Target plan
    pub plan: BillingPlan,
}

/// Current-user routes
pub struct UserRoutes;

impl UserRoutes {
    /// Create all current-user routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/users/me",
                put(Self::handle_update_profile).delete(Self::handle_delete_account),
            )
            .route("/api/users/me/billing", get(Self::handle_billing))
            .route("/api/users/me/plan", post(Self::handle_change_plan))
            .with_state(resources)
    }

    async fn reload(resources: &ServerResources, user_id: uuid::Uuid) -> AppResult<User> {
        resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UpdateProfileRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;

        let display_name = request
            .display_name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());
        let password_hash = match request.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(resources.auth.hash_password(password).await?)
            }
            None => None,
        };

        resources
            .database
            .update_user_profile(
                auth.user_id(),
                display_name.as_deref(),
                password_hash.as_deref(),
            )
            .await?;
        let user = Self::reload(&resources, auth.user_id()).await?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }

    async fn handle_delete_account(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        accounts::delete_account(
            &resources.database,
            resources.openai.as_ref(),
            resources.storage.as_ref(),
            auth.user_id(),
        )
        .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_billing(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let user = accounts::refresh_billing_period(&resources.database, auth.user_id()).await?;
        Ok((StatusCode::OK, Json(BillingSummary::from(&user))).into_response())
    }

    async fn handle_change_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<ChangePlanRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let user = accounts::change_plan(&resources.database, &auth.user, request.plan).await?;
        Ok((StatusCode::OK, Json(BillingSummary::from(&user))).into_response())
    }
}
