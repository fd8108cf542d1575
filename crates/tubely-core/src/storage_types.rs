use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Selects which `Storage` implementation the API wires into the upload
/// pipeline. Only one backend is active per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files under a statically served assets root.
    Local,
    /// Payload embedded into a `data:` URL.
    Inline,
    /// In-process registry, lost on restart.
    Ephemeral,
    /// Remote S3 bucket.
    S3,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "inline" | "data-uri" => Ok(StorageBackend::Inline),
            "ephemeral" | "memory" => Ok(StorageBackend::Ephemeral),
            "s3" => Ok(StorageBackend::S3),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Inline => write!(f, "inline"),
            StorageBackend::Ephemeral => write!(f, "ephemeral"),
            StorageBackend::S3 => write!(f, "s3"),
        }
    }
}
