// ABOUTME: Re-exports the domain models from airlab-core
// ABOUTME: Users, assistants, conversations, documents, integrations, and sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

pub use airlab_core::models::*;
