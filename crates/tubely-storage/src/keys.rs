//! Object key generation.
//!
//! Keys are unguessable by construction: they come from the OS random source
//! only, never from the video id, the owner or the clock.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;
use tubely_core::constants::OBJECT_KEY_RANDOM_BYTES;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Random source unavailable: {0}")]
    RandomSourceUnavailable(String),

    #[error("Invalid key namespace: {0}")]
    InvalidNamespace(String),
}

/// Opaque storage key, e.g. `landscape/3q2-7wEj....mp4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append `.<ext>` to the key.
    pub fn with_extension(self, extension: &str) -> Self {
        if extension.is_empty() {
            return self;
        }
        ObjectKey(format!("{}.{}", self.0, extension))
    }

    /// Leading namespace segment, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once('/').map(|(ns, _)| ns)
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn validate_namespace(namespace: &str) -> Result<(), KeyError> {
    let valid = !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(KeyError::InvalidNamespace(namespace.to_string()))
    }
}

/// Produces random, URL-safe object keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyGenerator;

impl KeyGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Draw a fresh key, optionally prefixed with `<namespace>/`.
    pub fn generate(&self, namespace: Option<&str>) -> Result<ObjectKey, KeyError> {
        let mut buf = [0u8; OBJECT_KEY_RANDOM_BYTES];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| KeyError::RandomSourceUnavailable(e.to_string()))?;
        let id = URL_SAFE_NO_PAD.encode(buf);

        match namespace {
            Some(ns) => {
                validate_namespace(ns)?;
                Ok(ObjectKey(format!("{}/{}", ns, id)))
            }
            None => Ok(ObjectKey(id)),
        }
    }
}
