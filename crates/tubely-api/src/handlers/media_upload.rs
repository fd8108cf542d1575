//! Thumbnail and video upload handlers
//!
//! The multipart part is handed to the pipeline as a stream; nothing here
//! buffers the payload.

use crate::auth::bearer_token;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use futures::TryStreamExt;
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use tubely_core::{AppError, MediaKind, VideoRecord};
use tubely_processing::UploadRequest;
use uuid::Uuid;

pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<VideoRecord>, HttpAppError> {
    upload_media(&state, &video_id, &headers, multipart, MediaKind::Thumbnail).await
}

pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<VideoRecord>, HttpAppError> {
    upload_media(&state, &video_id, &headers, multipart, MediaKind::Video).await
}

async fn upload_media(
    state: &AppState,
    video_id: &str,
    headers: &HeaderMap,
    mut multipart: Multipart,
    kind: MediaKind,
) -> Result<Json<VideoRecord>, HttpAppError> {
    let video_id = Uuid::parse_str(video_id)
        .map_err(|_| AppError::InvalidInput("Invalid video ID".to_string()))?;
    let bearer_token = bearer_token(headers);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(kind.field_name()) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let body = StreamReader::new(Box::pin(field.map_err(io::Error::other)));

        let outcome = state
            .pipeline
            .upload(UploadRequest {
                video_id,
                bearer_token,
                kind,
                content_type,
                body,
            })
            .await?;

        return Ok(Json(outcome.record));
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field '{}'",
        kind.field_name()
    ))
    .into())
}
