//! Wiring of the record store, storage backend, probe and pipeline.

use crate::auth::JwtIdentityProvider;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tubely_core::Config;
use tubely_db::{InMemoryRecordStore, RecordStore, VideoRepository};
use tubely_processing::{
    FfprobeProbe, FrameProbe, IdentityProvider, PipelineLimits, ProbeClassifier, StagingArea,
    UploadPipeline,
};
use tubely_storage::{create_storage, ConfiguredStorage, Storage};

/// Build application state from configuration.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let records: Arc<dyn RecordStore> = match super::database::setup_database(config).await? {
        Some(pool) => Arc::new(VideoRepository::new(pool)),
        None => {
            tracing::warn!("DATABASE_URL not set, video records are kept in memory");
            Arc::new(InMemoryRecordStore::new())
        }
    };

    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(backend = %storage.storage.backend_type(), "Storage backend ready");

    let probe = FfprobeProbe::new(
        config.ffprobe_path.clone(),
        Duration::from_secs(config.probe_timeout_secs),
    )
    .context("Invalid FFPROBE_PATH")?;

    let identity = Arc::new(JwtIdentityProvider::new(&config.jwt_secret));

    Ok(build_state(
        config.clone(),
        identity,
        records,
        storage,
        Arc::new(probe),
    ))
}

/// Assemble state from already constructed collaborators.
pub fn build_state(
    config: Config,
    identity: Arc<dyn IdentityProvider>,
    records: Arc<dyn RecordStore>,
    storage: ConfiguredStorage,
    probe: Arc<dyn FrameProbe>,
) -> Arc<AppState> {
    let limits = PipelineLimits {
        max_thumbnail_bytes: config.max_thumbnail_memory_bytes as u64,
        max_video_bytes: config.max_video_size_bytes,
    };

    let pipeline = UploadPipeline::new(
        identity.clone(),
        records.clone(),
        storage.storage.clone(),
        ProbeClassifier::new(probe),
        StagingArea::new(config.staging_dir.clone()),
        limits,
    );

    Arc::new(AppState {
        config,
        identity,
        records,
        storage: storage.storage,
        registry: storage.registry,
        pipeline: Arc::new(pipeline),
    })
}
