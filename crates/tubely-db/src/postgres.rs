use crate::store::{RecordStore, RecordStoreError};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tubely_core::VideoRecord;
use uuid::Uuid;

/// Repository for the `videos` table
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for VideoRepository {
    #[tracing::instrument(skip(self, record), fields(db.table = "videos", db.operation = "insert", db.record_id = %record.id))]
    async fn create(&self, record: VideoRecord) -> Result<VideoRecord, RecordStoreError> {
        let created = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            INSERT INTO videos (id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.thumbnail_url)
        .bind(&record.video_url)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RecordStoreError::WriteError(e.to_string()))?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %video_id))]
    async fn get(&self, video_id: Uuid) -> Result<VideoRecord, RecordStoreError> {
        sqlx::query_as::<Postgres, VideoRecord>(
            "SELECT id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at FROM videos WHERE id = $1",
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RecordStoreError::NotFound(video_id))
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "videos", db.operation = "update", db.record_id = %record.id))]
    async fn update(&self, record: &VideoRecord) -> Result<(), RecordStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET title = $2, description = $3, thumbnail_url = $4, video_url = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.thumbnail_url)
        .bind(&record.video_url)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RecordStoreError::WriteError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RecordStoreError::WriteError(format!(
                "video {} does not exist",
                record.id
            )));
        }

        Ok(())
    }
}
