//! Tubely Storage Library
//!
//! This crate provides the storage abstraction used by the upload pipeline
//! and its four interchangeable backends: a statically served local
//! directory, inline `data:` URLs, an in-process registry and S3.
//!
//! # Object key format
//!
//! Keys are `<random>.<ext>` or `<namespace>/<random>.<ext>`, where `<random>`
//! is 32 bytes of OS randomness in URL-safe base64 and `<namespace>` is the
//! video orientation. Keys never contain `..` or a leading `/`. Key
//! generation lives in the `keys` module so all backends see the same layout.

pub mod ephemeral;
pub mod factory;
pub mod inline;
pub mod keys;
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use ephemeral::{EphemeralRegistry, RegistryEntry};
pub use factory::{create_storage, ConfiguredStorage};
pub use inline::InlineStorage;
pub use keys::{KeyError, KeyGenerator, ObjectKey};
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectBody, Storage, StorageError, StorageResult, WriteRequest};
pub use tubely_core::StorageBackend;
