//! Serving for media held by the in-process registry.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tubely_core::{AppError, MediaKind};
use uuid::Uuid;

pub async fn get_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Response, HttpAppError> {
    serve_registered(&state, &video_id, MediaKind::Thumbnail).await
}

pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Response, HttpAppError> {
    serve_registered(&state, &video_id, MediaKind::Video).await
}

async fn serve_registered(
    state: &AppState,
    video_id: &str,
    kind: MediaKind,
) -> Result<Response, HttpAppError> {
    let video_id = Uuid::parse_str(video_id)
        .map_err(|_| AppError::InvalidInput("Invalid video ID".to_string()))?;

    let not_found = || AppError::NotFound(format!("No {} stored for video {}", kind, video_id));
    let registry = state.registry.as_ref().ok_or_else(not_found)?;
    let entry = registry.get(kind, video_id).await.ok_or_else(not_found)?;

    Ok(([(header::CONTENT_TYPE, entry.content_type)], entry.data).into_response())
}
