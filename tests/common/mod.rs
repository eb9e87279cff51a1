// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Builds in-memory server resources with fakes and creates signed-in users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `airlab_assistant_builder`
//!
//! Every test gets its own in-memory `SQLite` database, a temporary object
//! directory and fresh fakes of the external services.

use crate::helpers::fakes::{FakeAssistantsApi, FakeDocumentFetcher, RecordingChannelClient};
use airlab_assistant_builder::{
    auth::AuthManager,
    config::{
        AuthConfig, CorsConfig, DatabaseConfig, Environment, OpenAiConfig, RunPollConfig,
        ServerConfig, StorageConfig,
    },
    database_plugins::{factory::Database, DatabaseProvider},
    models::{Assistant, BillingPlan, User, UserRole},
    resources::ServerResources,
    server::build_router,
    services::assistants::{create_assistant, CreateAssistantRequest},
    storage::LocalObjectStorage,
};
use axum::Router;
use std::sync::{Arc, Once};
use tempfile::TempDir;

static INIT_LOGGER: Once = Once::new();

/// Password used for every test account
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Database {
    init_test_logging();
    Database::new("sqlite::memory:")
        .await
        .expect("in-memory database")
}

/// Configuration for tests: fast run polling, no secrets
pub fn test_config(object_dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_owned(),
        http_port: 0,
        environment: Environment::Testing,
        public_base_url: "https://airlab.test".to_owned(),
        database: DatabaseConfig {
            url: "sqlite::memory:".to_owned(),
        },
        auth: AuthConfig {
            session_secret: Some("test-session-secret".to_owned()),
            session_ttl_hours: 24,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        },
        openai: OpenAiConfig {
            api_key: Some("sk-test".to_owned()),
            base_url: "http://openai.invalid/v1".to_owned(),
            default_model: "gpt-4o-mini".to_owned(),
            summary_model: "gpt-4o-mini".to_owned(),
            timeout_secs: 5,
        },
        storage: StorageConfig {
            private_object_dir: object_dir.path().to_path_buf(),
            public_search_paths: Vec::new(),
            max_upload_bytes: 1024 * 1024,
        },
        cors: CorsConfig {
            allowed_origins: vec!["*".to_owned()],
        },
        run_poll: RunPollConfig {
            max_attempts: 5,
            interval_ms: 1,
        },
    }
}

/// A fully wired application backed by fakes
pub struct TestApp {
    pub resources: Arc<ServerResources>,
    pub openai: Arc<FakeAssistantsApi>,
    pub fetcher: Arc<FakeDocumentFetcher>,
    pub channels: Arc<RecordingChannelClient>,
    object_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let object_dir = TempDir::new().expect("temp dir");
        let config = test_config(&object_dir);
        Self::with_config(object_dir, config).await
    }

    pub async fn with_config(object_dir: TempDir, config: ServerConfig) -> Self {
        let database = create_test_database().await;
        let auth = AuthManager::new(b"test-session-secret", config.auth.session_ttl_hours);
        let openai = Arc::new(FakeAssistantsApi::default());
        let fetcher = Arc::new(FakeDocumentFetcher::default());
        let channels = Arc::new(RecordingChannelClient::default());
        let storage = Arc::new(
            LocalObjectStorage::new(object_dir.path().to_path_buf())
                .await
                .expect("object storage"),
        );

        let resources = Arc::new(ServerResources::new(
            database,
            auth,
            openai.clone(),
            storage,
            fetcher.clone(),
            channels.clone(),
            Arc::new(config),
        ));

        Self {
            resources,
            openai,
            fetcher,
            channels,
            object_dir,
        }
    }

    /// The complete router with middleware
    pub fn router(&self) -> Router {
        build_router(self.resources.clone())
    }

    pub fn database(&self) -> &Database {
        &self.resources.database
    }

    /// Create an active user and return it with a session token
    pub async fn create_user(&self, email: &str) -> (User, String) {
        self.create_user_with_role(email, UserRole::User).await
    }

    /// Create an administrator and return it with a session token
    pub async fn create_admin(&self, email: &str) -> (User, String) {
        self.create_user_with_role(email, UserRole::Admin).await
    }

    async fn create_user_with_role(&self, email: &str, role: UserRole) -> (User, String) {
        let hash = self
            .resources
            .auth
            .hash_password(TEST_PASSWORD)
            .await
            .unwrap();
        let mut user = User::new(email.to_owned(), hash, None);
        user.role = role;
        let token = self.insert_user(&user).await;
        (user, token)
    }

    /// Store a prepared user as-is and sign it in
    pub async fn insert_user(&self, user: &User) -> String {
        self.database().create_user(user).await.unwrap();
        let (token, _session) = self
            .resources
            .auth
            .login(self.database(), user, None)
            .await
            .unwrap();
        token
    }

    /// Give a user a plan and usage counter directly
    pub async fn set_usage(&self, user: &User, plan: BillingPlan, messages_used: i64) {
        self.database().set_user_plan(user.id, plan).await.unwrap();
        self.database().reset_messages_used(user.id).await.unwrap();
        for _ in 0..messages_used {
            self.database()
                .increment_messages_used(user.id)
                .await
                .unwrap();
        }
    }

    /// Create an assistant owned by `user` through the service layer
    pub async fn create_assistant(&self, user: &User, name: &str) -> Assistant {
        let request: CreateAssistantRequest = serde_json::from_value(serde_json::json!({
            "name": name,
            "instructions": "Answer customer questions.",
        }))
        .unwrap();
        create_assistant(
            self.database(),
            self.openai.as_ref(),
            user.id,
            "gpt-4o-mini",
            request,
        )
        .await
        .unwrap()
    }
}
