//! Upload pipeline: authorize → validate → stage → classify → store → record.

pub mod error;
pub mod pipeline;
pub mod traits;
pub mod types;

pub use error::{PipelineError, UploadFailure};
pub use pipeline::UploadPipeline;
pub use traits::{IdentityError, IdentityProvider};
pub use types::{PipelineLimits, UploadOutcome, UploadPhase, UploadRequest};
