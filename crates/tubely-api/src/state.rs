//! Application state shared by all handlers.

use std::sync::Arc;
use tubely_core::Config;
use tubely_db::RecordStore;
use tubely_processing::{IdentityProvider, UploadPipeline};
use tubely_storage::{EphemeralRegistry, Storage};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub identity: Arc<dyn IdentityProvider>,
    pub records: Arc<dyn RecordStore>,
    pub storage: Arc<dyn Storage>,
    /// Present only when the in-process registry is the active backend.
    pub registry: Option<Arc<EphemeralRegistry>>,
    pub pipeline: Arc<UploadPipeline>,
}
