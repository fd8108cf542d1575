//! Tubely media processing
//!
//! Orientation probing, request-scoped staging of inbound streams, and the
//! upload pipeline that ties identity, record store and storage together.

pub mod probe;
pub mod staging;
pub mod upload;

pub use probe::{
    classify_dimensions, FfprobeProbe, FrameProbe, ProbeClassifier, ProbeError, StreamGeometry,
};
pub use staging::{buffer, StagedFile, StagingArea, StagingError};
pub use upload::{
    IdentityError, IdentityProvider, PipelineError, PipelineLimits, UploadFailure, UploadOutcome,
    UploadPhase, UploadPipeline, UploadRequest,
};
