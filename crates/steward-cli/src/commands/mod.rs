//! CLI command implementations.

pub mod audit;
pub mod decide;
pub mod import;
pub mod list;
pub mod rules;
pub mod serve;
pub mod summary;
pub mod uploads;
pub mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use steward::store::MemoryStore;
use steward::{Actor, RequestContext, Steward, StewardConfig};

use crate::cli::GlobalArgs;
use crate::config::DEFAULT_STORE;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// A store snapshot opened for one command.
pub struct Workspace {
    pub store: Arc<MemoryStore>,
    pub steward: Steward,
    pub store_path: PathBuf,
    pub ctx: RequestContext,
}

impl Workspace {
    /// Open the snapshot named by `--store`, `STEWARD_STORE`, or the default.
    pub fn open(global: &GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let store_path = global
            .store
            .clone()
            .or_else(|| std::env::var_os("STEWARD_STORE").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));

        let config = load_config(global)?;
        let store = Arc::new(MemoryStore::open(&store_path)?);
        let steward = Steward::in_memory(Arc::clone(&store), config);
        let ctx = RequestContext::local(Actor::new(global.actor.clone(), global.role));

        if global.verbose {
            println!("Using store {}", store_path.display());
        }

        Ok(Self {
            store,
            steward,
            store_path,
            ctx,
        })
    }

    /// Write the snapshot back, keeping the previous one in history.
    pub async fn save(&self) -> Result<(), steward::StewardError> {
        self.store.save_with_history(&self.store_path).await
    }
}

/// Load `--config`, falling back to `STEWARD_CONFIG`, then defaults.
pub fn load_config(global: &GlobalArgs) -> Result<StewardConfig, steward::StewardError> {
    let path = global
        .config
        .clone()
        .or_else(|| std::env::var_os("STEWARD_CONFIG").map(PathBuf::from));
    match path {
        Some(path) => StewardConfig::load(path),
        None => Ok(StewardConfig::default()),
    }
}

/// Build the runtime each command runs on.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build()
}
