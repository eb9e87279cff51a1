// ABOUTME: Shared database logic for PostgreSQL and SQLite implementations
// ABOUTME: Row mappers and input validation used by both backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

/// Input validation logic (email, password, assistant fields, ownership, expiration)
pub mod validation;

/// Model ↔ SQL row conversion helpers
pub mod mappers;
