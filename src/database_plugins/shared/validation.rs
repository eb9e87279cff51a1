// ABOUTME: Input validation logic shared by route handlers and database implementations
// ABOUTME: Email, password, assistant field, ownership, and expiration checks returning AppResult
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! Input validation logic
//!
//! Every validator returns `AppResult<()>` so handlers can chain them with `?`.

use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Validate email format
///
/// Performs basic email validation (contains '@' and minimum length).
///
/// # Examples
/// ```
/// # use airlab_assistant_builder::database_plugins::shared::validation::validate_email;
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("invalid").is_err());
/// assert!(validate_email("@").is_err());
/// ```
pub fn validate_email(email: &str) -> AppResult<()> {
    if !email.contains('@') || email.len() < 3 {
        return Err(AppError::invalid_input("Invalid email format"));
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < limits::MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Password must be at least {} characters",
            limits::MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Validate an assistant name (non-empty after trimming, bounded length)
pub fn validate_assistant_name(name: &str) -> AppResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("Assistant name is required"));
    }
    if trimmed.chars().count() > limits::MAX_ASSISTANT_NAME_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Assistant name must be at most {} characters",
            limits::MAX_ASSISTANT_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Validate sampling temperature
///
/// # Examples
/// ```
/// # use airlab_assistant_builder::database_plugins::shared::validation::validate_temperature;
/// assert!(validate_temperature(0.7).is_ok());
/// assert!(validate_temperature(2.5).is_err());
/// assert!(validate_temperature(f32::NAN).is_err());
/// ```
pub fn validate_temperature(temperature: f32) -> AppResult<()> {
    if !(0.0..=limits::MAX_TEMPERATURE).contains(&temperature) {
        return Err(AppError::invalid_input(format!(
            "Temperature must be between 0 and {}",
            limits::MAX_TEMPERATURE
        )));
    }
    Ok(())
}

/// Validate a model name
pub fn validate_model(model: &str) -> AppResult<()> {
    if model.trim().is_empty() {
        return Err(AppError::invalid_input("Model is required"));
    }
    Ok(())
}

/// Validate expiration timestamp
///
/// `now` is injected for testability.
///
/// # Examples
/// ```
/// # use airlab_assistant_builder::database_plugins::shared::validation::validate_not_expired;
/// # use chrono::{Utc, Duration};
/// let now = Utc::now();
/// assert!(validate_not_expired(now + Duration::hours(1), now, "Session").is_ok());
/// assert!(validate_not_expired(now - Duration::hours(1), now, "Session").is_err());
/// ```
pub fn validate_not_expired(
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
    entity_type: &str,
) -> AppResult<()> {
    if expires_at <= now {
        return Err(AppError::invalid_input(format!(
            "{entity_type} has expired"
        )));
    }
    Ok(())
}

/// Validate that an entity belongs to the requesting user
///
/// Foreign entities are reported as missing so their ids are not disclosed.
pub fn validate_ownership(entity_user_id: Uuid, requester_id: Uuid, entity_type: &str) -> AppResult<()> {
    if entity_user_id != requester_id {
        return Err(AppError::not_found(entity_type));
    }
    Ok(())
}
