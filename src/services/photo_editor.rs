// ABOUTME: Photo editor service validating prompts and sizes before calling image endpoints
// ABOUTME: Generation uses dall-e-3 and edits use dall-e-2 unless overridden
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::constants::defaults;
use crate::errors::{AppError, AppResult};
use crate::openai::{AssistantsApi, ImageData, ImageEditRequest, ImageGenerationRequest};

/// Sizes accepted by the image endpoints
pub const ALLOWED_SIZES: &[&str] = &["256x256", "512x512", "1024x1024", "1792x1024", "1024x1792"];

/// Longest accepted prompt
const MAX_PROMPT_CHARS: usize = 4_000;

fn validate_prompt(prompt: &str) -> AppResult<String> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::invalid_input("Prompt is required"));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(AppError::invalid_input(format!(
            "Prompt exceeds {MAX_PROMPT_CHARS} characters"
        )));
    }
    Ok(prompt.to_owned())
}

/// Resolve an optional size against the allowed list
///
/// # Errors
///
/// Returns `INVALID_INPUT` for sizes outside [`ALLOWED_SIZES`]
pub fn resolve_size(size: Option<&str>) -> AppResult<String> {
    match size.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(defaults::IMAGE_SIZE.to_owned()),
        Some(s) if ALLOWED_SIZES.contains(&s) => Ok(s.to_owned()),
        Some(s) => Err(AppError::invalid_input(format!(
            "Unsupported size '{s}', expected one of {}",
            ALLOWED_SIZES.join(", ")
        ))),
    }
}

/// Generate an image from a prompt
///
/// # Errors
///
/// Validation errors and upstream failures
pub async fn generate(
    api: &dyn AssistantsApi,
    prompt: &str,
    size: Option<&str>,
) -> AppResult<Vec<ImageData>> {
    let request = ImageGenerationRequest {
        model: defaults::IMAGE_GENERATION_MODEL.to_owned(),
        prompt: validate_prompt(prompt)?,
        size: resolve_size(size)?,
        n: 1,
    };
    api.generate_image(&request).await
}

/// Edit an uploaded image with a prompt
///
/// # Errors
///
/// Validation errors and upstream failures
pub async fn edit(
    api: &dyn AssistantsApi,
    image: Vec<u8>,
    file_name: &str,
    prompt: &str,
    size: Option<&str>,
) -> AppResult<Vec<ImageData>> {
    if image.is_empty() {
        return Err(AppError::invalid_input("Image file is required"));
    }
    let request = ImageEditRequest {
        model: defaults::IMAGE_EDIT_MODEL.to_owned(),
        prompt: validate_prompt(prompt)?,
        size: resolve_size(size)?,
        image,
        file_name: file_name.to_owned(),
    };
    api.edit_image(request).await
}
