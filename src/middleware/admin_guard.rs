// ABOUTME: Central admin authorization guard for routes requiring admin privileges
// ABOUTME: Verifies the authenticated user has the admin role and returns 403 otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! Admin Authorization Guard
//!
//! Handlers call [`require_admin`] right after authenticating instead of
//! inspecting the role inline.

use crate::auth::AuthContext;
use crate::errors::{AppError, ErrorCode};
use crate::models::User;

/// Require admin privileges for an authenticated request
///
/// The user record was loaded during authentication, so no extra lookup is
/// needed.
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` (403) for non-admin users
pub fn require_admin(auth: &AuthContext) -> Result<&User, AppError> {
    if !auth.user.role.is_admin() {
        tracing::debug!(user_id = %auth.user.id, "Rejected non-admin request");
        return Err(AppError::new(
            ErrorCode::PermissionDenied,
            "Admin privileges required",
        ));
    }
    Ok(&auth.user)
}
