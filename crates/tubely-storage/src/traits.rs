//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::keys::ObjectKey;
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;
use tubely_core::MediaKind;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Where the bytes of an object come from.
#[derive(Debug, Clone)]
pub enum ObjectBody {
    /// Payload already held in memory (thumbnails).
    Bytes(Bytes),
    /// Payload staged on disk (videos). Read from offset 0 on every open.
    File(PathBuf),
}

impl ObjectBody {
    /// Size of the body in bytes without reading it.
    pub async fn len(&self) -> StorageResult<u64> {
        match self {
            ObjectBody::Bytes(bytes) => Ok(bytes.len() as u64),
            ObjectBody::File(path) => Ok(tokio::fs::metadata(path).await?.len()),
        }
    }

    /// Load the whole body into memory.
    pub async fn into_bytes(self) -> StorageResult<Bytes> {
        match self {
            ObjectBody::Bytes(bytes) => Ok(bytes),
            ObjectBody::File(path) => Ok(Bytes::from(tokio::fs::read(&path).await?)),
        }
    }

    /// Open the body as a fresh reader positioned at the start.
    pub async fn into_reader(self) -> StorageResult<Pin<Box<dyn AsyncRead + Send + Unpin>>> {
        match self {
            ObjectBody::Bytes(bytes) => Ok(Box::pin(std::io::Cursor::new(bytes))),
            ObjectBody::File(path) => Ok(Box::pin(tokio::fs::File::open(&path).await?)),
        }
    }
}

/// A single object write.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    /// Video the object belongs to. Only the in-process registry addresses by it.
    pub video_id: Uuid,
    pub kind: MediaKind,
    pub key: ObjectKey,
    pub content_type: String,
    pub body: ObjectBody,
}

/// Storage abstraction trait
///
/// Every backend takes the same write request and answers with a URL a
/// client can resolve. The upload pipeline only ever sees this trait, so the
/// active backend is purely a configuration choice. Writes to an existing key
/// overwrite it.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist the object and return its public URL.
    async fn write(&self, request: WriteRequest) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
