// ABOUTME: Core types and constants for the Air Lab assistant builder
// ABOUTME: Foundation crate with error handling, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

#![deny(unsafe_code)]

//! # Air Lab Core
//!
//! Foundation crate providing shared types and constants for the Air Lab
//! assistant builder. It changes infrequently so the server crate gets the
//! incremental compilation benefits of the workspace split.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Application-wide constants organized by domain
//! - **models**: Users, assistants, conversations, documents, integrations, sessions

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and configuration values organized by domain
pub mod constants;

/// Core data models mirrored in the relational store
pub mod models;
