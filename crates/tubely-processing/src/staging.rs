//! Request-scoped staging of inbound upload streams
//!
//! A staged file lives exactly as long as its `StagedFile` handle. The
//! backing temp file is removed on drop, so every exit path of a request
//! (success, rejection, I/O error, cancellation) cleans up after itself.

use bytes::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

const STAGING_PREFIX: &str = "tubely-upload-";
const COPY_CHUNK_BYTES: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Payload exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Staging I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Where inbound streams are spooled to disk.
#[derive(Debug, Clone, Default)]
pub struct StagingArea {
    dir: Option<PathBuf>,
}

impl StagingArea {
    /// `None` stages into the OS temp dir.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Copy `reader` into a fresh temp file, failing as soon as more than
    /// `limit` bytes have been read.
    pub async fn stage<R>(&self, reader: &mut R, limit: u64) -> Result<StagedFile, StagingError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let temp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(self.dir())?;
        let mut file = tokio::fs::File::from_std(temp.as_file().try_clone()?);

        let mut chunk = vec![0u8; COPY_CHUNK_BYTES];
        let mut size: u64 = 0;
        loop {
            let read = reader.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            size += read as u64;
            if size > limit {
                tracing::warn!(limit_bytes = limit, path = %temp.path().display(), "Staged upload exceeded size limit");
                return Err(StagingError::PayloadTooLarge { limit });
            }
            file.write_all(&chunk[..read]).await?;
        }
        file.flush().await?;

        tracing::debug!(size_bytes = size, path = %temp.path().display(), "Upload staged");

        Ok(StagedFile { temp, size })
    }
}

/// Read `reader` into memory, failing once more than `limit` bytes arrive.
pub async fn buffer<R>(reader: &mut R, limit: u64) -> Result<Bytes, StagingError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut data = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut data)
        .await?;

    if data.len() as u64 > limit {
        return Err(StagingError::PayloadTooLarge { limit });
    }

    Ok(Bytes::from(data))
}

/// A staged upload on disk. Dropping it removes the file.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Open an independent read handle positioned at offset 0.
    pub async fn open(&self) -> io::Result<tokio::fs::File> {
        tokio::fs::File::open(self.temp.path()).await
    }

    /// Remove the backing file now, reporting any error.
    pub fn release(self) -> io::Result<()> {
        self.temp.close()
    }
}
