//! Video record persistence
//!
//! The upload pipeline talks to a `RecordStore`; this crate ships an
//! in-memory store for development and tests, and a PostgreSQL repository.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryRecordStore;
pub use postgres::VideoRepository;
pub use store::{RecordStore, RecordStoreError};
