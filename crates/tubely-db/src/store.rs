use async_trait::async_trait;
use thiserror::Error;
use tubely_core::{AppError, VideoRecord};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("Video not found: {0}")]
    NotFound(Uuid),

    #[error("Failed to write video record: {0}")]
    WriteError(String),

    #[error("Record store unavailable: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for RecordStoreError {
    fn from(err: sqlx::Error) -> Self {
        RecordStoreError::Backend(err.to_string())
    }
}

impl From<RecordStoreError> for AppError {
    fn from(err: RecordStoreError) -> Self {
        match err {
            RecordStoreError::NotFound(id) => AppError::NotFound(format!("Video {} not found", id)),
            other => AppError::RecordStore(other.to_string()),
        }
    }
}

/// Source of truth for video ownership and media URLs.
///
/// Updates are last-write-wins; there is no version check.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new draft video and return it as stored.
    async fn create(&self, record: VideoRecord) -> Result<VideoRecord, RecordStoreError>;

    async fn get(&self, video_id: Uuid) -> Result<VideoRecord, RecordStoreError>;

    async fn update(&self, record: &VideoRecord) -> Result<(), RecordStoreError>;
}
