use thiserror::Error;
use tubely_core::AppError;
use tubely_db::RecordStoreError;
use tubely_storage::{KeyError, StorageError};
use uuid::Uuid;

use super::traits::IdentityError;
use super::types::UploadPhase;
use crate::probe::ProbeError;
use crate::staging::StagingError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Video {0} not found")]
    VideoNotFound(Uuid),

    #[error("Failed to read video record: {0}")]
    RecordRead(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Failed to stage upload: {0}")]
    Staging(std::io::Error),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to update video record: {0}")]
    RecordUpdate(String),
}

impl PipelineError {
    /// Caller mistakes, as opposed to dependency failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Unauthorized(_)
                | PipelineError::VideoNotFound(_)
                | PipelineError::UnsupportedMediaType(_)
                | PipelineError::PayloadTooLarge { .. }
        )
    }
}

impl From<IdentityError> for PipelineError {
    fn from(err: IdentityError) -> Self {
        PipelineError::Unauthorized(err.to_string())
    }
}

impl From<StagingError> for PipelineError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::PayloadTooLarge { limit } => PipelineError::PayloadTooLarge { limit },
            StagingError::Io(e) => PipelineError::Staging(e),
        }
    }
}

impl From<RecordStoreError> for PipelineError {
    fn from(err: RecordStoreError) -> Self {
        match err {
            RecordStoreError::NotFound(id) => PipelineError::VideoNotFound(id),
            other => PipelineError::RecordRead(other.to_string()),
        }
    }
}

/// Terminal `Failed` state: the error plus the phase it interrupted.
#[derive(Debug, Error)]
#[error("Upload failed before reaching {phase}: {error}")]
pub struct UploadFailure {
    pub phase: UploadPhase,
    #[source]
    pub error: PipelineError,
}

impl UploadFailure {
    pub fn new(phase: UploadPhase, error: impl Into<PipelineError>) -> Self {
        Self {
            phase,
            error: error.into(),
        }
    }
}

impl From<UploadFailure> for AppError {
    fn from(failure: UploadFailure) -> Self {
        match failure.error {
            PipelineError::Unauthorized(msg) => AppError::Unauthorized(msg),
            PipelineError::VideoNotFound(id) => AppError::NotFound(format!("Video {} not found", id)),
            PipelineError::RecordRead(msg) | PipelineError::RecordUpdate(msg) => {
                AppError::RecordStore(msg)
            }
            PipelineError::UnsupportedMediaType(msg) => AppError::UnsupportedMediaType(msg),
            PipelineError::PayloadTooLarge { limit } => {
                AppError::PayloadTooLarge(format!("Upload exceeds the limit of {} bytes", limit))
            }
            PipelineError::Staging(e) => AppError::Internal(format!("Failed to stage upload: {}", e)),
            PipelineError::Probe(e) => AppError::Probe(e.to_string()),
            PipelineError::Key(e) => AppError::Internal(e.to_string()),
            PipelineError::Storage(e) => AppError::Storage(e.to_string()),
        }
    }
}
