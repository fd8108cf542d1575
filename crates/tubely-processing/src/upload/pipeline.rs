use std::sync::Arc;
use tokio::io::AsyncRead;
use tracing::Span;
use tubely_core::models::{extension_for, parse_media_type};
use tubely_core::{MediaAsset, MediaKind, Orientation, VideoRecord};
use tubely_db::RecordStore;
use tubely_storage::{KeyGenerator, ObjectBody, Storage, WriteRequest};
use uuid::Uuid;

use super::error::{PipelineError, UploadFailure};
use super::traits::{IdentityError, IdentityProvider};
use super::types::{PipelineLimits, UploadOutcome, UploadPhase, UploadRequest};
use crate::probe::ProbeClassifier;
use crate::staging::{buffer, StagingArea};

/// Drives one upload from bearer credential to persisted URL.
///
/// Each call is an independent unit of work; the pipeline itself holds no
/// per-request state and is shared across requests behind an `Arc`.
pub struct UploadPipeline {
    identity: Arc<dyn IdentityProvider>,
    records: Arc<dyn RecordStore>,
    storage: Arc<dyn Storage>,
    classifier: ProbeClassifier,
    staging: StagingArea,
    keys: KeyGenerator,
    limits: PipelineLimits,
}

impl UploadPipeline {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        records: Arc<dyn RecordStore>,
        storage: Arc<dyn Storage>,
        classifier: ProbeClassifier,
        staging: StagingArea,
        limits: PipelineLimits,
    ) -> Self {
        Self {
            identity,
            records,
            storage,
            classifier,
            staging,
            keys: KeyGenerator::new(),
            limits,
        }
    }

    /// Run the pipeline for one request.
    #[tracing::instrument(
        skip(self, request),
        fields(video_id = %request.video_id, kind = %request.kind, caller_id = tracing::field::Empty)
    )]
    pub async fn upload<R>(&self, request: UploadRequest<R>) -> Result<UploadOutcome, UploadFailure>
    where
        R: AsyncRead + Unpin + Send,
    {
        let result = self.run(request).await;

        match &result {
            Ok(outcome) => tracing::info!(
                object_key = %outcome.asset.object_key,
                orientation = %outcome.asset.orientation,
                size_bytes = outcome.asset.size_bytes,
                backend = %self.storage.backend_type(),
                "Upload completed"
            ),
            Err(failure) if failure.error.is_client_error() => tracing::warn!(
                phase = %failure.phase,
                error = %failure.error,
                "Upload rejected"
            ),
            Err(failure) => tracing::error!(
                phase = %failure.phase,
                error = %failure.error,
                "Upload failed"
            ),
        }

        result
    }

    async fn run<R>(&self, request: UploadRequest<R>) -> Result<UploadOutcome, UploadFailure>
    where
        R: AsyncRead + Unpin + Send,
    {
        let UploadRequest {
            video_id,
            bearer_token,
            kind,
            content_type,
            mut body,
        } = request;
        tracing::debug!(phase = %UploadPhase::Received, "Upload received");

        let (caller_id, mut record) = self
            .authorize(video_id, bearer_token.as_deref())
            .await
            .map_err(|e| UploadFailure::new(UploadPhase::Authorized, e))?;
        Span::current().record("caller_id", tracing::field::display(caller_id));
        tracing::debug!(phase = %UploadPhase::Authorized, "Caller owns video");

        let media_type = validate_content_type(kind, &content_type)
            .map_err(|e| UploadFailure::new(UploadPhase::Validated, e))?;
        tracing::debug!(phase = %UploadPhase::Validated, media_type = %media_type, "Content type accepted");

        let limit = self.limits.for_kind(kind);
        let (payload, staged, size_bytes, orientation) = if kind.is_staged() {
            let staged = self
                .staging
                .stage(&mut body, limit)
                .await
                .map_err(|e| UploadFailure::new(UploadPhase::Staged, e))?;
            tracing::debug!(phase = %UploadPhase::Staged, size_bytes = staged.size(), "Upload staged");

            let orientation = self
                .classifier
                .classify(staged.path())
                .await
                .map_err(|e| UploadFailure::new(UploadPhase::Classified, e))?;
            tracing::debug!(phase = %UploadPhase::Classified, orientation = %orientation, "Video classified");

            let size = staged.size();
            (ObjectBody::File(staged.path().to_path_buf()), Some(staged), size, orientation)
        } else {
            let data = buffer(&mut body, limit)
                .await
                .map_err(|e| UploadFailure::new(UploadPhase::Staged, e))?;
            let size = data.len() as u64;
            (ObjectBody::Bytes(data), None, size, Orientation::Unclassified)
        };

        let key = self
            .keys
            .generate(orientation.namespace())
            .map_err(|e| UploadFailure::new(UploadPhase::Stored, e))?
            .with_extension(extension_for(&media_type));

        let stored = self
            .storage
            .write(WriteRequest {
                video_id,
                kind,
                key: key.clone(),
                content_type: media_type.clone(),
                body: payload,
            })
            .await;

        // The staged copy is no longer needed whether or not the write succeeded.
        if let Some(staged) = staged {
            if let Err(e) = staged.release() {
                tracing::warn!(error = %e, "Failed to remove staged upload");
            }
        }

        let url = stored.map_err(|e| UploadFailure::new(UploadPhase::Stored, e))?;
        tracing::debug!(phase = %UploadPhase::Stored, object_key = %key, "Object stored");

        record.set_media_url(kind, url.clone());
        self.records.update(&record).await.map_err(|e| {
            UploadFailure::new(
                UploadPhase::Recorded,
                PipelineError::RecordUpdate(e.to_string()),
            )
        })?;
        tracing::debug!(phase = %UploadPhase::Recorded, "Video record updated");

        Ok(UploadOutcome {
            record,
            asset: MediaAsset {
                owner_id: caller_id,
                kind,
                content_type: media_type,
                orientation,
                object_key: key.as_str().to_string(),
                size_bytes,
                url,
            },
        })
    }

    async fn authorize(
        &self,
        video_id: Uuid,
        bearer_token: Option<&str>,
    ) -> Result<(Uuid, VideoRecord), PipelineError> {
        let token = bearer_token
            .filter(|t| !t.is_empty())
            .ok_or(IdentityError::MissingCredential)?;
        let caller_id = self.identity.exchange(token).await?;

        let record = self.records.get(video_id).await?;
        if !record.is_owned_by(caller_id) {
            return Err(PipelineError::Unauthorized(format!(
                "user {} does not own video {}",
                caller_id, video_id
            )));
        }

        Ok((caller_id, record))
    }
}

/// Normalize the declared content type and check it against the kind's allow-list.
fn validate_content_type(kind: MediaKind, raw: &str) -> Result<String, PipelineError> {
    let media_type = parse_media_type(raw).ok_or_else(|| {
        PipelineError::UnsupportedMediaType(format!("unparseable content type {:?}", raw))
    })?;

    if !kind.allowed_content_types().contains(&media_type.as_str()) {
        return Err(PipelineError::UnsupportedMediaType(format!(
            "{} is not accepted for {} uploads",
            media_type, kind
        )));
    }

    Ok(media_type)
}
