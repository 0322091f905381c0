//! Image edit proxy endpoint.
//!
//! Validates the inbound (image, prompt) pair, then drives the upstream
//! client through the retry policy and streams the edited image back. All
//! failures come out as the JSON error taxonomy in [`crate::error`].

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use postcraft_core::{AppError, ErrorMetadata, MAX_PROMPT_CHARS};
use postcraft_services::{run_with_retry, RetryPolicy};

use crate::error::HttpAppError;
use crate::state::AppState;

/// Inbound multipart form, as submitted by the wizard frontend.
struct EditRequest {
    image_bytes: Bytes,
    image_filename: String,
    image_content_type: Option<String>,
    prompt: Option<String>,
}

/// Read the `image` and `prompt` parts out of the multipart form. Unknown
/// fields are ignored; a second `image` field is rejected.
async fn extract_edit_request(mut multipart: Multipart) -> Result<EditRequest, AppError> {
    let mut image_bytes: Option<Bytes> = None;
    let mut image_filename: Option<String> = None;
    let mut image_content_type: Option<String> = None;
    let mut prompt: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart form: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "image" => {
                if image_bytes.is_some() {
                    return Err(AppError::Validation(
                        "Multiple image fields are not allowed; send exactly one field named 'image'"
                            .to_string(),
                    ));
                }
                image_filename = field.file_name().map(|s: &str| s.to_string());
                image_content_type = field.content_type().map(|s: &str| s.to_string());
                let data = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read image data: {}", e))
                })?;
                image_bytes = Some(data);
            }
            "prompt" => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read prompt field: {}", e))
                })?;
                prompt = Some(text);
            }
            _ => {}
        }
    }

    Ok(EditRequest {
        image_bytes: image_bytes.unwrap_or_default(),
        image_filename: image_filename.unwrap_or_else(|| "upload".to_string()),
        image_content_type,
        prompt,
    })
}

/// Normalize a MIME type by stripping parameters
/// (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// The ordered fail-fast validation sequence. Returns the validated prompt.
fn validate_request(request: &EditRequest, state: &AppState) -> Result<String, AppError> {
    let prompt_present = request.prompt.as_deref().is_some_and(|p| !p.is_empty());
    if !prompt_present || request.image_bytes.is_empty() {
        return Err(AppError::Validation(
            "Prompt and image file are required".to_string(),
        ));
    }

    let prompt = request.prompt.clone().unwrap_or_default();
    if prompt.trim().is_empty() {
        return Err(AppError::Validation("Prompt cannot be empty".to_string()));
    }

    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(AppError::Validation(format!(
            "Prompt is too long (max {} characters)",
            MAX_PROMPT_CHARS
        )));
    }

    let max_bytes = state.config.max_file_size_bytes;
    if request.image_bytes.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "Image must be smaller than {}MB",
            max_bytes / 1024 / 1024
        )));
    }

    if let Some(content_type) = request.image_content_type.as_deref() {
        let normalized = normalize_mime_type(content_type).to_lowercase();
        let allowed = &state.config.allowed_content_types;
        if !allowed.iter().any(|ct| ct.to_lowercase() == normalized) {
            return Err(AppError::Validation(
                "Only image files are allowed".to_string(),
            ));
        }
    }

    Ok(prompt)
}

#[tracing::instrument(skip(state, multipart), fields(operation = "edit_image"))]
pub async fn edit_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let request = extract_edit_request(multipart).await?;
    let prompt = validate_request(&request, &state)?;

    let upstream_config = &state.config.upstream;
    if !upstream_config.is_set() {
        return Err(AppError::UpstreamNotConfigured.into());
    }
    if upstream_config.validated_url().is_none() {
        return Err(AppError::UpstreamInvalidUrl.into());
    }

    let prompt_preview: String = prompt.chars().take(100).collect();
    tracing::info!(
        prompt = %prompt_preview,
        filename = %request.image_filename,
        image_bytes = request.image_bytes.len(),
        "Forwarding edit request to AI server"
    );

    let policy = RetryPolicy::new(upstream_config.max_retries, upstream_config.retry_delay);
    let edited = run_with_retry(policy, || {
        state
            .upstream
            .send(request.image_bytes.clone(), &request.image_filename, &prompt)
    })
    .await
    .map_err(|e| {
        let app_error: AppError = e.into();
        tracing::warn!(
            code = app_error.error_code(),
            error = %app_error,
            "Edit request failed after retries"
        );
        HttpAppError(app_error)
    })?;

    tracing::info!(
        result_bytes = edited.bytes.len(),
        "Received edited image from AI server"
    );

    Ok(([(header::CONTENT_TYPE, edited.content_type)], edited.bytes).into_response())
}
