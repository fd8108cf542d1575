use crate::traits::{Storage, StorageError, StorageResult, WriteRequest};
use crate::StorageBackend;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Storage that embeds the payload into a `data:` URL.
///
/// Nothing is persisted outside the returned URL, so the record store ends up
/// holding the whole object. Payloads above `max_bytes` are refused.
#[derive(Clone, Debug)]
pub struct InlineStorage {
    max_bytes: usize,
}

impl InlineStorage {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

#[async_trait]
impl Storage for InlineStorage {
    async fn write(&self, request: WriteRequest) -> StorageResult<String> {
        let size = request.body.len().await?;
        if size > self.max_bytes as u64 {
            tracing::warn!(
                key = %request.key,
                size_bytes = size,
                max_bytes = self.max_bytes,
                "Payload too large for inline storage"
            );
            return Err(StorageError::UploadFailed(format!(
                "payload of {} bytes exceeds inline limit of {} bytes",
                size, self.max_bytes
            )));
        }

        let data = request.body.into_bytes().await?;

        let url = format!(
            "data:{};base64,{}",
            request.content_type,
            STANDARD.encode(&data)
        );

        tracing::info!(
            key = %request.key,
            size_bytes = data.len(),
            "Inline storage write successful"
        );

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Inline
    }
}
