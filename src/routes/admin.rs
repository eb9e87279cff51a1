// ABOUTME: Admin route handlers for user management, balances, usage stats and assistant listing
// ABOUTME: Every handler requires an authenticated user with the admin role
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! Admin routes
//!
//! Accessible with the normal session token of an admin user. Plans set
//! here are not charged to the balance.

use super::parse_id;
use crate::auth::AuthContext;
use crate::constants::limits;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::middleware::{authenticate, require_admin};
use crate::models::{BillingPlan, User, UserRole};
use crate::resources::ServerResources;
use crate::services::accounts;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Pagination query
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Page size
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Offset for pagination
    #[serde(default)]
    pub offset: i64,
}

const fn default_limit() -> i64 {
    limits::DEFAULT_PAGE_SIZE
}

impl PageQuery {
    fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 500), self.offset.max(0))
    }
}

/// Admin user update
#[derive(Debug, Default, Deserialize)]
pub struct AdminUpdateUserRequest {
    /// New role
    pub role: Option<UserRole>,
    /// Enable or disable the account
    pub is_active: Option<bool>,
    /// Plan assigned without charge
    pub plan: Option<BillingPlan>,
}

/// Balance adjustment
#[derive(Debug, Deserialize)]
pub struct BalanceAdjustmentRequest {
    /// Credit (positive) or debit (negative), floored at zero
    pub amount_cents: i64,
}

/// Platform counters
#[derive(Debug, Serialize)]
pub struct AdminStats {
    /// Registered users
    pub users: i64,
    /// Assistants across all users
    pub assistants: i64,
    /// Conversations across all channels
    pub conversations: i64,
}

/// Admin routes
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/users", get(Self::handle_list_users))
            .route(
                "/api/admin/users/:user_id",
                put(Self::handle_update_user).delete(Self::handle_delete_user),
            )
            .route(
                "/api/admin/users/:user_id/balance",
                post(Self::handle_adjust_balance),
            )
            .route("/api/admin/stats", get(Self::handle_stats))
            .route("/api/admin/assistants", get(Self::handle_list_assistants))
            .with_state(resources)
    }

    async fn authenticate_admin(
        headers: &HeaderMap,
        resources: &ServerResources,
    ) -> AppResult<AuthContext> {
        let auth = authenticate(headers, resources).await?;
        require_admin(&auth)?;
        Ok(auth)
    }

    async fn load_user(resources: &ServerResources, user_id: &str) -> AppResult<User> {
        let user_id = parse_id(user_id, "user")?;
        resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    async fn handle_list_users(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(page): Query<PageQuery>,
    ) -> Result<Response, AppError> {
        Self::authenticate_admin(&headers, &resources).await?;
        let (limit, offset) = page.clamped();
        let users = resources.database.list_users(limit, offset).await?;
        let total = resources.database.get_user_count().await?;
        Ok((StatusCode::OK, Json(json!({ "users": users, "total": total }))).into_response())
    }

    async fn handle_update_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<String>,
        Json(request): Json<AdminUpdateUserRequest>,
    ) -> Result<Response, AppError> {
        let admin = Self::authenticate_admin(&headers, &resources).await?;
        let user = Self::load_user(&resources, &user_id).await?;

        if request.role.is_some() || request.is_active.is_some() {
            let role = request.role.unwrap_or(user.role);
            let is_active = request.is_active.unwrap_or(user.is_active);
            resources
                .database
                .update_user_status(user.id, role, is_active)
                .await?;
            if !is_active {
                resources.database.delete_user_sessions(user.id).await?;
            }
        }
        if let Some(plan) = request.plan {
            resources.database.set_user_plan(user.id, plan).await?;
        }
        info!(admin_id = %admin.user_id(), user_id = %user.id, "Admin updated user");

        let updated = Self::load_user(&resources, &user_id).await?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    }

    async fn handle_adjust_balance(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<String>,
        Json(request): Json<BalanceAdjustmentRequest>,
    ) -> Result<Response, AppError> {
        let admin = Self::authenticate_admin(&headers, &resources).await?;
        let user = Self::load_user(&resources, &user_id).await?;
        let balance = resources
            .database
            .adjust_user_balance(user.id, request.amount_cents)
            .await?;
        info!(
            admin_id = %admin.user_id(),
            user_id = %user.id,
            amount_cents = request.amount_cents,
            balance_cents = balance,
            "Admin adjusted balance"
        );
        Ok((
            StatusCode::OK,
            Json(json!({ "user_id": user.id, "balance_cents": balance })),
        )
            .into_response())
    }

    async fn handle_delete_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<String>,
    ) -> Result<Response, AppError> {
        let admin = Self::authenticate_admin(&headers, &resources).await?;
        let user_id = parse_id(&user_id, "user")?;
        if user_id == admin.user_id() {
            return Err(AppError::invalid_input(
                "Admins cannot delete their own account here",
            ));
        }
        accounts::delete_account(
            &resources.database,
            resources.openai.as_ref(),
            resources.storage.as_ref(),
            user_id,
        )
        .await?;
        info!(admin_id = %admin.user_id(), user_id = %user_id, "Admin deleted user");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        Self::authenticate_admin(&headers, &resources).await?;
        let stats = AdminStats {
            users: resources.database.get_user_count().await?,
            assistants: resources.database.get_assistant_count().await?,
            conversations: resources.database.get_conversation_count().await?,
        };
        Ok((StatusCode::OK, Json(stats)).into_response())
    }

    async fn handle_list_assistants(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(page): Query<PageQuery>,
    ) -> Result<Response, AppError> {
        Self::authenticate_admin(&headers, &resources).await?;
        let (limit, offset) = page.clamped();
        let assistants = resources
            .database
            .list_all_assistants(limit, offset)
            .await?;
        Ok((StatusCode::OK, Json(assistants)).into_response())
    }
}
