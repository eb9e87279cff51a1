// ABOUTME: HTTP middleware for authentication, authorization, CORS and request logging
// ABOUTME: Shared by every route module through ServerResources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

/// Bearer token and session cookie authentication
pub mod auth;

/// Admin role guard
pub mod admin_guard;

/// Cross-origin configuration
pub mod cors;

/// Per-request access log
pub mod request_logging;

pub use admin_guard::require_admin;
pub use auth::{authenticate, get_cookie_value};
pub use cors::{setup_cors, widget_cors};
pub use request_logging::log_requests;
