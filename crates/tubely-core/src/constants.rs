//! Shared constants.

/// Multipart field name carrying a thumbnail upload.
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// Multipart field name carrying a video upload.
pub const VIDEO_FIELD: &str = "video";

/// Content types accepted for thumbnails.
pub const THUMBNAIL_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Content types accepted for videos.
pub const VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4"];

/// In-memory ceiling for a thumbnail body (10 MiB).
pub const DEFAULT_THUMBNAIL_MEMORY_BYTES: usize = 10 << 20;

/// Ceiling for a video body (1 GiB).
pub const DEFAULT_VIDEO_MAX_BYTES: u64 = 1 << 30;

/// Ceiling for payloads encoded into `data:` URLs.
pub const DEFAULT_INLINE_MAX_BYTES: usize = 10 << 20;

/// Number of random bytes behind every object key.
pub const OBJECT_KEY_RANDOM_BYTES: usize = 32;

/// Issuer expected on access tokens.
pub const TOKEN_ISSUER: &str = "tubely-access";
