use crate::{config::Config, core::LabelRegistry};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub labels: Arc<LabelRegistry>,
    /// Label moves take this shared; the shutdown export takes it exclusively
    /// so no file changes folders while the archive is written.
    pub fs_gate: Arc<RwLock<()>>,
}

impl AppState {
    pub fn new(config: Config, labels: LabelRegistry) -> Self {
        Self {
            config: Arc::new(config),
            labels: Arc::new(labels),
            fs_gate: Arc::new(RwLock::new(())),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.config.images_dir
    }
}
