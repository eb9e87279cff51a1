// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Conversation engine, knowledge ingestion, Google Docs import, analyzer, images, widget
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! Domain service layer
//!
//! Services are reusable across the REST routes and the messenger webhooks,
//! so the same business rules apply regardless of the entry point.

/// Billing plans and account deletion
pub mod accounts;

/// Business description analysis with keyword fallback
pub mod analyzer;

/// Assistant lifecycle mirrored to `OpenAI`
pub mod assistants;

/// Chat turns shared by web, widget and messenger channels
pub mod conversation;

/// Google Docs fetch, strip, summarize and index
pub mod google_docs;

/// Knowledge-base uploads and vector store wiring
pub mod knowledge;

/// Image generation and editing
pub mod photo_editor;

/// Embeddable widget snippet generator
pub mod widget;
