//! Collaborators the pipeline consumes but does not implement.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Missing bearer credential")]
    MissingCredential,

    #[error("Invalid bearer credential: {0}")]
    InvalidCredential(String),
}

/// Exchanges a bearer credential for the caller's user id.
///
/// Implemented by the API (JWT).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange(&self, bearer_token: &str) -> Result<Uuid, IdentityError>;
}
