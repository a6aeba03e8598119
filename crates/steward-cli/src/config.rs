//! Process configuration read from the environment.

use std::path::PathBuf;

use steward::StewardError;

/// Default snapshot file when neither `--store` nor `STEWARD_STORE` is set.
pub const DEFAULT_STORE: &str = "steward-store.json";

/// Server and storage settings.
///
/// | Env Var          | Default               |
/// |------------------|-----------------------|
/// | `STEWARD_HOST`   | `127.0.0.1`           |
/// | `STEWARD_PORT`   | `3141`                |
/// | `STEWARD_STORE`  | `steward-store.json`  |
/// | `STEWARD_CONFIG` | unset (defaults)      |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Snapshot file the store is loaded from and saved to.
    pub store_path: PathBuf,
    /// Optional library configuration file.
    pub config_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, StewardError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, StewardError> {
        let host = var("STEWARD_HOST").unwrap_or_else(|| "127.0.0.1".into());

        let port = match var("STEWARD_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                StewardError::Config(format!("STEWARD_PORT must be a valid port, got '{}'", raw))
            })?,
            None => 3141,
        };

        let store_path = var("STEWARD_STORE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));

        let config_path = var("STEWARD_CONFIG")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            store_path,
            config_path,
        })
    }
}
