use crate::store::{RecordStore, RecordStoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tubely_core::VideoRecord;
use uuid::Uuid;

/// Process-local record store. Used when no `DATABASE_URL` is configured.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<Uuid, VideoRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&self, record: VideoRecord) -> Result<VideoRecord, RecordStoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(RecordStoreError::WriteError(format!(
                "video {} already exists",
                record.id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, video_id: Uuid) -> Result<VideoRecord, RecordStoreError> {
        self.records
            .read()
            .await
            .get(&video_id)
            .cloned()
            .ok_or(RecordStoreError::NotFound(video_id))
    }

    async fn update(&self, record: &VideoRecord) -> Result<(), RecordStoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(RecordStoreError::WriteError(format!(
                "video {} does not exist",
                record.id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_core::MediaKind;

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = InMemoryRecordStore::new();
        let id = Uuid::new_v4();
        match store.get(id).await {
            Err(RecordStoreError::NotFound(missing)) => assert_eq!(missing, id),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let store = InMemoryRecordStore::new();
        let mut record = store
            .create(VideoRecord::new(Uuid::new_v4(), "boots", ""))
            .await
            .unwrap();
        record.set_media_url(MediaKind::Thumbnail, "data:image/png;base64,AA==".to_string());
        store.update(&record).await.unwrap();

        let fetched = store.get(record.id).await.unwrap();
        assert_eq!(
            fetched.media_url(MediaKind::Thumbnail),
            Some("data:image/png;base64,AA==")
        );
    }

    #[tokio::test]
    async fn test_update_unknown_record_fails() {
        let store = InMemoryRecordStore::new();
        let record = VideoRecord::new(Uuid::new_v4(), "t", "d");
        assert!(matches!(
            store.update(&record).await,
            Err(RecordStoreError::WriteError(_))
        ));
    }
}
