// ABOUTME: Main library entry point for the Air Lab Assistant Builder backend
// ABOUTME: Exposes REST routes, messenger webhooks and the services behind them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Air Lab Assistant Builder
//!
//! A multi-tenant backend for building customer-support assistants on top of
//! the `OpenAI` Assistants API and deploying them to a website widget and to
//! Telegram, VK and `WhatsApp`.
//!
//! ## Features
//!
//! - **Assistants**: create, update and delete assistants mirrored to `OpenAI`
//! - **Knowledge base**: file uploads and Google Docs imports indexed into vector stores
//! - **Conversations**: thread-backed chats with run polling and monthly quotas
//! - **Channels**: webhook ingestion and replies for messengers
//! - **Widget**: embeddable HTML snippet with a public chat endpoint
//! - **Accounts**: cookie or bearer sessions, billing plans and admin tools
//!
//! ## Architecture
//!
//! - **Routes**: thin axum handlers mapping HTTP to services
//! - **Services**: business rules shared by web, widget and messenger entry points
//! - **`OpenAI`**: typed client behind the `AssistantsApi` trait
//! - **Database plugins**: `SQLite` and `PostgreSQL` behind `DatabaseProvider`
//! - **Storage**: private object files with sidecar metadata
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use airlab_assistant_builder::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Air Lab configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Password hashing and session tokens
pub mod auth;

/// Telegram, VK and `WhatsApp` parsing and senders
pub mod channels;

/// Environment configuration
pub mod config;

/// Application constants and defaults
pub mod constants;

/// Database abstraction with `SQLite` and `PostgreSQL` backends
pub mod database_plugins;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Domain models
pub mod models;

/// `OpenAI` Assistants API client and run polling
pub mod openai;

/// Shared server state
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Business logic services
pub mod services;

/// Object storage for uploaded files
pub mod storage;
