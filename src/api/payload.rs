//! Payload normalizer for `POST /judge`.
//!
//! Accepts a JSON object or a multipart form and produces a validated
//! [`JudgePayload`]. Both wire shapes go through the same field rules:
//! `emoji` and `image` must be non-empty strings, `description` and
//! `roundId` are kept only when they are strings.

use crate::judge::{to_data_url, JudgePayload};
use axum::{
    body::to_bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Client input faults. The display text is returned to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unsupported content type. Use JSON or multipart form data.")]
    UnsupportedContentType,

    #[error("Invalid request payload.")]
    InvalidPayload,

    #[error("`emoji` is required.")]
    MissingEmoji,

    #[error("`image` is required.")]
    MissingImage,
}

/// Field values as received, before validation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawFields {
    pub emoji: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub round_id: Option<String>,
}

impl RawFields {
    /// Pick the string-valued fields out of a JSON value.
    ///
    /// Anything other than an object counts as an object with no fields.
    pub fn from_json(value: &Value) -> Self {
        let string_field = |name: &str| match value.get(name) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        if !value.is_object() {
            return Self::default();
        }
        Self {
            emoji: string_field("emoji"),
            description: string_field("description"),
            image: string_field("image"),
            round_id: string_field("roundId"),
        }
    }
}

/// Apply the field rules shared by both wire shapes.
pub fn normalize_fields(fields: RawFields) -> Result<JudgePayload, ValidationError> {
    let emoji = fields
        .emoji
        .filter(|e| !e.is_empty())
        .ok_or(ValidationError::MissingEmoji)?;
    let image = fields
        .image
        .filter(|i| !i.is_empty())
        .ok_or(ValidationError::MissingImage)?;

    Ok(JudgePayload {
        emoji,
        description: fields.description,
        image,
        round_id: fields.round_id,
    })
}

/// A `null` body is rejected as unreadable; other non-objects have no fields.
pub fn normalize_json(value: &Value) -> Result<JudgePayload, ValidationError> {
    if value.is_null() {
        return Err(ValidationError::InvalidPayload);
    }
    normalize_fields(RawFields::from_json(value))
}

/// Parse and normalize a JSON body.
pub fn normalize_json_bytes(body: &[u8]) -> Result<JudgePayload, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse JSON payload");
        ValidationError::InvalidPayload
    })?;
    normalize_json(&value)
}

/// Normalize an incoming request, reading at most `max_body_bytes`.
pub async fn normalize_request(
    request: Request,
    max_body_bytes: usize,
) -> Result<JudgePayload, ValidationError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if content_type.contains("application/json") {
        let body = to_bytes(request.into_body(), max_body_bytes)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to read request body");
                ValidationError::InvalidPayload
            })?;
        return normalize_json_bytes(&body);
    }

    if content_type.contains("multipart/form-data") {
        let fields = read_multipart(request).await?;
        return normalize_fields(fields);
    }

    Err(ValidationError::UnsupportedContentType)
}

/// Collect the judge fields from a multipart form.
///
/// The first occurrence of each name wins. A file part under `image` is
/// re-encoded as a data URL; a file part under any other name counts as a
/// non-string value and leaves that field absent.
async fn read_multipart(request: Request) -> Result<RawFields, ValidationError> {
    let mut multipart = Multipart::from_request(request, &()).await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to open multipart body");
        ValidationError::InvalidPayload
    })?;

    let mut seen: HashMap<String, Option<String>> = HashMap::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if seen.contains_key(&name) {
            continue;
        }

        let value = if field.file_name().is_some() {
            if name == "image" {
                let mime_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                Some(to_data_url(mime_type.as_deref(), &bytes))
            } else {
                None
            }
        } else {
            Some(field.text().await.map_err(multipart_error)?)
        };
        seen.insert(name, value);
    }

    let mut take = |name: &str| seen.remove(name).flatten();
    Ok(RawFields {
        emoji: take("emoji"),
        description: take("description"),
        image: take("image"),
        round_id: take("roundId"),
    })
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ValidationError {
    tracing::warn!(error = %e, "Failed to read multipart field");
    ValidationError::InvalidPayload
}
