// ABOUTME: Centralized resource container for dependency injection into route handlers
// ABOUTME: Holds the database, auth manager, OpenAI client, storage, fetcher and channel senders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! # Server Resources
//!
//! Every router receives one `Arc<ServerResources>`. External services sit
//! behind trait objects so integration tests can swap in in-process fakes.

use crate::auth::{generate_session_secret, AuthManager};
use crate::channels::{ChannelClient, ChannelEndpoints, HttpChannelClient};
use crate::config::environment::ServerConfig;
use crate::database_plugins::factory::Database;
use crate::errors::AppResult;
use crate::openai::{AssistantsApi, OpenAiClient};
use crate::services::google_docs::{DocumentFetcher, HttpDocumentFetcher, GOOGLE_DOCS_BASE_URL};
use crate::storage::{LocalObjectStorage, ObjectStorage};
use std::sync::Arc;
use tracing::warn;

/// Shared server state
#[derive(Clone)]
pub struct ServerResources {
    /// Database backend
    pub database: Arc<Database>,
    /// Session issuing and verification
    pub auth: Arc<AuthManager>,
    /// `OpenAI` Assistants API
    pub openai: Arc<dyn AssistantsApi>,
    /// Private object storage
    pub storage: Arc<dyn ObjectStorage>,
    /// Google Docs export fetcher
    pub fetcher: Arc<dyn DocumentFetcher>,
    /// Messenger senders
    pub channels: Arc<dyn ChannelClient>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Assemble resources from already constructed parts
    #[must_use]
    pub fn new(
        database: Database,
        auth: AuthManager,
        openai: Arc<dyn AssistantsApi>,
        storage: Arc<dyn ObjectStorage>,
        fetcher: Arc<dyn DocumentFetcher>,
        channels: Arc<dyn ChannelClient>,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            database: Arc::new(database),
            auth: Arc::new(auth),
            openai,
            storage,
            fetcher,
            channels,
            config,
        }
    }

    /// Build production resources backed by HTTP clients and local storage
    ///
    /// # Errors
    ///
    /// Returns an error if a client cannot be created or the storage root
    /// cannot be prepared
    pub async fn from_config(database: Database, config: Arc<ServerConfig>) -> AppResult<Self> {
        let auth = config.auth.session_secret.as_deref().map_or_else(
            || {
                warn!("SESSION_SECRET not set, sessions will not survive a restart");
                AuthManager::new(&generate_session_secret(), config.auth.session_ttl_hours)
            },
            |secret| AuthManager::new(secret.as_bytes(), config.auth.session_ttl_hours),
        );
        let openai = Arc::new(OpenAiClient::new(&config.openai)?);
        let storage = Arc::new(LocalObjectStorage::new(config.storage.private_object_dir.clone()).await?);
        let fetcher = Arc::new(HttpDocumentFetcher::new(GOOGLE_DOCS_BASE_URL)?);
        let channels = Arc::new(HttpChannelClient::new(ChannelEndpoints::default())?);

        Ok(Self::new(
            database, auth, openai, storage, fetcher, channels, config,
        ))
    }
}
