//! Video analytics upload.
//!
//! The upload is read into memory (bounded by the configured body limit) and
//! forwarded to the backend as a multipart `video` field. The analysis comes
//! back unchanged.

use axum::{
    Json,
    extract::{Multipart, State},
};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::services::VideoAnalysis;
use crate::services::backend::VIDEO_FIELD;
use crate::state::AppState;

const DEFAULT_FILE_NAME: &str = "upload.mp4";

/// Analyze an uploaded video.
#[instrument(skip_all, fields(user = %user.email))]
pub async fn analyze(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Json<VideoAnalysis>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let content_type = field.content_type().map(String::from);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("Please select a video to upload".to_string()));
        }

        tracing::info!(file_name = %file_name, size = bytes.len(), "Analyzing video");
        add_breadcrumb("video", "Uploaded video for analysis", None);

        let analysis = state
            .backend()
            .analyze_video(file_name, content_type.as_deref(), bytes.to_vec())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Video analysis failed");
                AppError::from(e)
            })?;

        return Ok(Json(analysis));
    }

    Err(AppError::BadRequest("Please select a video to upload".to_string()))
}
