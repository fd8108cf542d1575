//! Configuration module
//!
//! Settings are read from the environment (after loading `.env` when present)
//! and validated once at startup.

use std::env;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_INLINE_MAX_BYTES, DEFAULT_THUMBNAIL_MEMORY_BYTES, DEFAULT_VIDEO_MAX_BYTES,
};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8091;
const PROBE_TIMEOUT_SECS: u64 = 30;
const MIN_JWT_SECRET_LEN: usize = 32;
const DB_MAX_CONNECTIONS: u32 = 10;
const DB_TIMEOUT_SECONDS: u64 = 30;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    /// Public origin used when building local and ephemeral URLs.
    pub public_base_url: String,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    /// Record store connection. `None` keeps records in memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub assets_root: PathBuf,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub inline_max_bytes: usize,
    // Upload limits
    pub max_thumbnail_memory_bytes: usize,
    pub max_video_size_bytes: u64,
    // Classification
    pub ffprobe_path: String,
    pub probe_timeout_secs: u64,
    pub staging_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageBackend::Local,
        };

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_thumbnail_memory_bytes = match env::var("MAX_THUMBNAIL_MEMORY_MB").ok() {
            Some(raw) => usize::try_from(megabytes_to_bytes("MAX_THUMBNAIL_MEMORY_MB", &raw)?)
                .map_err(|_| anyhow::anyhow!("MAX_THUMBNAIL_MEMORY_MB is too large"))?,
            None => DEFAULT_THUMBNAIL_MEMORY_BYTES,
        };

        let max_video_size_bytes = match env::var("MAX_VIDEO_SIZE_MB").ok() {
            Some(raw) => megabytes_to_bytes("MAX_VIDEO_SIZE_MB", &raw)?,
            None => DEFAULT_VIDEO_MAX_BYTES,
        };

        let config = Config {
            server_port,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", server_port)),
            environment,
            cors_origins,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DB_MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(DB_MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| DB_TIMEOUT_SECONDS.to_string())
                .parse()
                .unwrap_or(DB_TIMEOUT_SECONDS),
            storage_backend,
            assets_root: env::var("ASSETS_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./assets")),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            inline_max_bytes: env::var("INLINE_MAX_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_INLINE_MAX_BYTES),
            max_thumbnail_memory_bytes,
            max_video_size_bytes,
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            probe_timeout_secs: env::var("PROBE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(PROBE_TIMEOUT_SECS),
            staging_dir: env::var("STAGING_DIR").ok().map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.database_url.is_some() && self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be greater than zero"));
        }

        if self.max_thumbnail_memory_bytes == 0 || self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size ceilings must be greater than zero"));
        }

        if self.probe_timeout_secs == 0 {
            return Err(anyhow::anyhow!("PROBE_TIMEOUT_SECS must be greater than zero"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Inline => {
                if self.inline_max_bytes == 0 {
                    return Err(anyhow::anyhow!(
                        "INLINE_MAX_BYTES must be greater than zero when using inline storage"
                    ));
                }
            }
            StorageBackend::Local | StorageBackend::Ephemeral => {}
        }

        Ok(())
    }
}

/// Convert a `*_MB` setting to bytes, rejecting values that overflow.
fn megabytes_to_bytes(name: &str, raw: &str) -> Result<u64, anyhow::Error> {
    let mb: u64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a whole number of megabytes", name))?;
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("{} is too large", name))
}
