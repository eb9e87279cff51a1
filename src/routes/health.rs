// ABOUTME: Health check route handler for service monitoring
// ABOUTME: Reports the crate version and whether the database answers a ping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::database_plugins::DatabaseProvider;
use crate::resources::ServerResources;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        async fn health_handler(
            State(resources): State<Arc<ServerResources>>,
        ) -> Json<serde_json::Value> {
            let database = match resources.database.ping().await {
                Ok(()) => "ok",
                Err(e) => {
                    tracing::warn!("Health check database ping failed: {e}");
                    "error"
                }
            };
            Json(serde_json::json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "database": database,
            }))
        }

        Router::new()
            .route("/health", get(health_handler))
            .with_state(resources)
    }
}
