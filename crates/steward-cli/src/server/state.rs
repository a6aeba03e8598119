//! Application state for the web server.

use std::path::PathBuf;
use std::sync::Arc;

use steward::store::MemoryStore;
use steward::{Steward, StewardConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The stewardship service.
    pub steward: Arc<Steward>,
    /// The store behind the service, kept for snapshots.
    pub store: Arc<MemoryStore>,
    /// Snapshot file written after each mutation, if any.
    pub store_path: Option<PathBuf>,
}

impl AppState {
    /// Create new application state over an in-memory store.
    pub fn new(store: Arc<MemoryStore>, config: StewardConfig) -> Self {
        let steward = Steward::in_memory(Arc::clone(&store), config);
        Self {
            steward: Arc::new(steward),
            store,
            store_path: None,
        }
    }

    /// Persist a snapshot to `path` after every mutating request.
    pub fn with_snapshot(mut self, path: PathBuf) -> Self {
        self.store_path = Some(path);
        self
    }

    /// Write the snapshot if one is configured. Failures are logged.
    pub async fn persist(&self) {
        let Some(path) = &self.store_path else {
            return;
        };
        if let Err(e) = self.store.save(path).await {
            tracing::error!(path = %path.display(), error = %e, "Failed to save store snapshot");
        }
    }
}
