use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use crate::constants::{
    THUMBNAIL_CONTENT_TYPES, THUMBNAIL_FIELD, VIDEO_CONTENT_TYPES, VIDEO_FIELD,
};

/// Which media slot of a video record an upload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Thumbnail,
    Video,
}

impl MediaKind {
    /// Multipart field the payload is read from.
    pub fn field_name(&self) -> &'static str {
        match self {
            MediaKind::Thumbnail => THUMBNAIL_FIELD,
            MediaKind::Video => VIDEO_FIELD,
        }
    }

    pub fn allowed_content_types(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Thumbnail => THUMBNAIL_CONTENT_TYPES,
            MediaKind::Video => VIDEO_CONTENT_TYPES,
        }
    }

    /// Videos go through a temp file and get classified; thumbnails stay in memory.
    pub fn is_staged(&self) -> bool {
        matches!(self, MediaKind::Video)
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Thumbnail => write!(f, "thumbnail"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Frame geometry classification of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
    /// Never probed (thumbnails).
    Unclassified,
}

impl Orientation {
    /// Key prefix segment for this orientation.
    ///
    /// `Other` gets its own segment; only unclassified media share the root.
    pub fn namespace(&self) -> Option<&'static str> {
        match self {
            Orientation::Landscape => Some("landscape"),
            Orientation::Portrait => Some("portrait"),
            Orientation::Other => Some("other"),
            Orientation::Unclassified => None,
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Other => write!(f, "other"),
            Orientation::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// A stored upload. Created once per successful request, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaAsset {
    pub owner_id: Uuid,
    pub kind: MediaKind,
    pub content_type: String,
    pub orientation: Orientation,
    pub object_key: String,
    pub size_bytes: u64,
    pub url: String,
}

/// Normalize a `Content-Type` header value to its bare media type.
///
/// Parameters are dropped and the result lowercased. Returns `None` when the
/// value is not of the form `type/subtype`.
pub fn parse_media_type(raw: &str) -> Option<String> {
    let essence = raw.split(';').next()?.trim().to_ascii_lowercase();
    let (top, sub) = essence.split_once('/')?;
    let valid = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    if valid(top) && valid(sub) {
        Some(essence)
    } else {
        None
    }
}

/// File extension for a media type: the subtype (`video/mp4` → `mp4`).
pub fn extension_for(media_type: &str) -> &str {
    media_type
        .split_once('/')
        .map(|(_, sub)| sub)
        .unwrap_or(media_type)
}
