//! Types for the upload pipeline.

use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tubely_core::constants::{DEFAULT_THUMBNAIL_MEMORY_BYTES, DEFAULT_VIDEO_MAX_BYTES};
use tubely_core::{MediaAsset, MediaKind, VideoRecord};
use uuid::Uuid;

/// Pipeline states. A failure is tagged with the state the pipeline was
/// trying to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadPhase {
    Received,
    Authorized,
    Validated,
    Staged,
    Classified,
    Stored,
    Recorded,
    Done,
}

impl Display for UploadPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            UploadPhase::Received => "received",
            UploadPhase::Authorized => "authorized",
            UploadPhase::Validated => "validated",
            UploadPhase::Staged => "staged",
            UploadPhase::Classified => "classified",
            UploadPhase::Stored => "stored",
            UploadPhase::Recorded => "recorded",
            UploadPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Size ceilings per media kind.
#[derive(Debug, Clone, Copy)]
pub struct PipelineLimits {
    /// In-memory ceiling for thumbnails.
    pub max_thumbnail_bytes: u64,
    /// Staging ceiling for videos.
    pub max_video_bytes: u64,
}

impl PipelineLimits {
    pub fn for_kind(&self, kind: MediaKind) -> u64 {
        match kind {
            MediaKind::Thumbnail => self.max_thumbnail_bytes,
            MediaKind::Video => self.max_video_bytes,
        }
    }
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            max_thumbnail_bytes: DEFAULT_THUMBNAIL_MEMORY_BYTES as u64,
            max_video_bytes: DEFAULT_VIDEO_MAX_BYTES,
        }
    }
}

/// One inbound upload.
pub struct UploadRequest<R> {
    pub video_id: Uuid,
    /// `None` when the request carried no bearer credential.
    pub bearer_token: Option<String>,
    pub kind: MediaKind,
    /// Raw `Content-Type` of the uploaded part.
    pub content_type: String,
    pub body: R,
}

/// Result of a completed upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub record: VideoRecord,
    pub asset: MediaAsset,
}
