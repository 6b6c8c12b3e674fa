//! Presigned upload URLs for source and reference tracks.

use axum::extract::State;
use axum::Json;
use remix_core::error::CoreError;
use remix_storage::{keys, SignedUpload};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SignUploadRequest {
    #[validate(length(min = 1, max = 255, message = "filename must be 1-255 characters"))]
    pub filename: String,
    #[validate(length(min = 1, max = 127, message = "content_type must be 1-127 characters"))]
    pub content_type: String,
}

/// POST /api/v1/uploads/sign
///
/// Returns a short-lived PUT URL under `uploads/`. Answers 501 when object
/// storage is not configured.
pub async fn sign_upload(
    State(state): State<AppState>,
    Json(input): Json<SignUploadRequest>,
) -> AppResult<Json<SignedUpload>> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    let key = keys::upload_key(&input.filename);
    let signed = state.storage.sign_put(&key, &input.content_type).await?;

    tracing::info!(object_key = %signed.object_key, "Upload URL signed");
    Ok(Json(signed))
}
