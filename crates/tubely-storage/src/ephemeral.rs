use crate::traits::{Storage, StorageResult, WriteRequest};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tubely_core::MediaKind;
use uuid::Uuid;

/// One object held by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub content_type: String,
    pub data: Bytes,
}

/// In-process object registry.
///
/// Objects are addressed by video and media kind, so each video holds at most
/// one thumbnail and one video; a new write replaces the old one. Contents
/// are lost on restart. The registry is shared by handle (`Arc`) between the
/// pipeline that writes and the route that serves.
#[derive(Debug)]
pub struct EphemeralRegistry {
    base_url: String,
    entries: RwLock<HashMap<(MediaKind, Uuid), RegistryEntry>>,
}

impl EphemeralRegistry {
    /// # Arguments
    /// * `base_url` - Public origin of the API (e.g., "http://localhost:8091")
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, kind: MediaKind, video_id: Uuid) -> Option<RegistryEntry> {
        self.entries.read().await.get(&(kind, video_id)).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn generate_url(&self, kind: MediaKind, video_id: Uuid) -> String {
        let collection = match kind {
            MediaKind::Thumbnail => "thumbnails",
            MediaKind::Video => "videos",
        };
        format!(
            "{}/api/{}/{}",
            self.base_url.trim_end_matches('/'),
            collection,
            video_id
        )
    }
}

#[async_trait]
impl Storage for EphemeralRegistry {
    async fn write(&self, request: WriteRequest) -> StorageResult<String> {
        let data = request.body.into_bytes().await?;
        let size_bytes = data.len();

        self.entries.write().await.insert(
            (request.kind, request.video_id),
            RegistryEntry {
                content_type: request.content_type,
                data,
            },
        );

        tracing::info!(
            video_id = %request.video_id,
            kind = %request.kind,
            key = %request.key,
            size_bytes,
            "Ephemeral registry write successful"
        );

        Ok(self.generate_url(request.kind, request.video_id))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Ephemeral
    }
}
