use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::media::MediaKind;

/// Video metadata record.
///
/// Owned by the record store, not by the upload pipeline: the pipeline reads
/// it for the ownership check and writes back exactly one URL field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VideoRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    pub fn new(user_id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: description.into(),
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, caller_id: Uuid) -> bool {
        self.user_id == caller_id
    }

    /// URL currently recorded for the given media kind.
    pub fn media_url(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Thumbnail => self.thumbnail_url.as_deref(),
            MediaKind::Video => self.video_url.as_deref(),
        }
    }

    /// Replace the URL for `kind`, leaving the other field untouched.
    pub fn set_media_url(&mut self, kind: MediaKind, url: String) {
        match kind {
            MediaKind::Thumbnail => self.thumbnail_url = Some(url),
            MediaKind::Video => self.video_url = Some(url),
        }
        self.updated_at = Utc::now();
    }
}
