//! Snapshot persistence for the in-memory store - save/load JSON files.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::error::{Result, StewardError};

use super::memory::{Collections, MemoryStore};

impl MemoryStore {
    /// Load a store from a snapshot file written by [`MemoryStore::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            StewardError::Persistence(format!("Failed to open file '{}': {}", path.display(), e))
        })?;

        let reader = BufReader::new(file);
        let mut collections: Collections = serde_json::from_reader(reader).map_err(|e| {
            StewardError::Persistence(format!(
                "Failed to parse store snapshot '{}': {}",
                path.display(),
                e
            ))
        })?;

        for entity in collections.entities.values_mut() {
            entity.refresh_normalized_name();
        }

        tracing::debug!(
            path = %path.display(),
            entities = collections.entities.len(),
            runs = collections.runs.len(),
            decisions = collections.decisions.len(),
            "Loaded store snapshot"
        );

        Ok(Self::from_collections(collections))
    }

    /// Load a snapshot if the file exists, otherwise start empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Save every collection to a JSON snapshot file.
    ///
    /// The snapshot is taken under the read lock, then written to a
    /// temporary sibling and renamed over `path` on the blocking pool.
    /// Saves on one store are applied in call order.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.persist(path.as_ref(), false).await
    }

    /// Save, first copying any existing snapshot into the history directory.
    ///
    /// ```text
    /// data/
    /// ├── store.json
    /// └── store.history/
    ///     └── 2024-12-30T10-00-00.json
    /// ```
    pub async fn save_with_history(&self, path: impl AsRef<Path>) -> Result<()> {
        self.persist(path.as_ref(), true).await
    }

    async fn persist(&self, path: &Path, keep_history: bool) -> Result<()> {
        let _ordered = self.save_lock.lock().await;

        let bytes = {
            let guard = self.inner.read().await;
            serde_json::to_vec_pretty(&*guard).map_err(|e| {
                StewardError::Persistence(format!("Failed to serialize store snapshot: {}", e))
            })?
        };

        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            if keep_history {
                back_up(&path)?;
            }
            write_replacing(&path, &bytes)
        })
        .await
        .map_err(|e| StewardError::Persistence(format!("Snapshot write aborted: {}", e)))?
    }
}

/// Copy an existing snapshot into its history directory.
fn back_up(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let history_dir = snapshot_history_dir(path);
    fs::create_dir_all(&history_dir).map_err(|e| StewardError::Io {
        path: history_dir.clone(),
        source: e,
    })?;

    let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f").to_string();
    let backup = history_dir.join(format!("{}.json", stamp));
    fs::copy(path, &backup).map_err(|e| StewardError::Io {
        path: backup.clone(),
        source: e,
    })?;
    Ok(())
}

/// Write `bytes` to a temporary file next to `path`, then rename it into place.
fn write_replacing(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| StewardError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let staged = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    fs::write(&staged, bytes).map_err(|e| {
        StewardError::Persistence(format!(
            "Failed to write file '{}': {}",
            staged.display(),
            e
        ))
    })?;

    fs::rename(&staged, path).map_err(|e| {
        let _ = fs::remove_file(&staged);
        StewardError::Persistence(format!(
            "Failed to replace file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Get the history directory for a snapshot file.
///
/// ```
/// use steward::store::snapshot_history_dir;
///
/// let dir = snapshot_history_dir("data/store.json");
/// assert_eq!(dir.to_string_lossy(), "data/store.history");
/// ```
pub fn snapshot_history_dir(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let parent = path.parent().unwrap_or(Path::new("."));

    parent.join(format!("{}.history", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::entity::{Credential, Entity, EntityStatus};
    use crate::store::RecordStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_load_roundtrip_keeps_status() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let store = MemoryStore::with_entities(vec![
            Entity::new("HCP-1", "Ana Lima").with_credential(Credential::new("SP", "1")),
        ]);
        store.set_status("HCP-1", EntityStatus::Validated).await.unwrap();
        store.save(&path).await.unwrap();

        let loaded = MemoryStore::load(&path).unwrap();
        let entity = loaded.get_entity("HCP-1").await.unwrap().unwrap();
        assert_eq!(entity.status, EntityStatus::Validated);
        assert_eq!(entity.normalized_name, "ANA LIMA");
    }

    #[tokio::test]
    async fn test_save_with_history_backs_up_previous() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = MemoryStore::new();

        store.save_with_history(&path).await.unwrap();
        store.save_with_history(&path).await.unwrap();

        let backups: Vec<_> = fs::read_dir(snapshot_history_dir(&path))
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(backups.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_leave_one_whole_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = Arc::new(MemoryStore::new());

        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            let path = path.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .put_entity(Entity::new(format!("HCP-{}", i), "Ana Lima"))
                    .await
                    .unwrap();
                store.save(&path).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        store.save(&path).await.unwrap();

        let loaded = MemoryStore::load(&path).unwrap();
        assert_eq!(loaded.inner.try_read().unwrap().entities.len(), 16);

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "store.json")
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::open(dir.path().join("nope.json")).unwrap();
        assert_eq!(store.inner.try_read().unwrap().entities.len(), 0);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();

        let err = MemoryStore::load(&path).unwrap_err();
        assert!(matches!(err, StewardError::Persistence(_)));
    }
}
