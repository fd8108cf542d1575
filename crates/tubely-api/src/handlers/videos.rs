//! Draft video creation. Uploads attach media to a video created here.

use crate::auth::bearer_token;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;
use tubely_core::{AppError, VideoRecord};
use tubely_db::RecordStore;
use tubely_processing::IdentityProvider;

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

pub async fn create_video(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateVideoRequest>,
) -> Result<(StatusCode, Json<VideoRecord>), HttpAppError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer credential".to_string()))?;
    let user_id = state
        .identity
        .exchange(&token)
        .await
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()).into());
    }

    let record = state
        .records
        .create(VideoRecord::new(user_id, request.title, request.description))
        .await
        .map_err(AppError::from)?;

    tracing::info!(video_id = %record.id, user_id = %user_id, "Video created");

    Ok((StatusCode::CREATED, Json(record)))
}
