//! In-memory store guarded by a tokio `RwLock`.

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::audit::AuditEvent;
use crate::decision::Decision;
use crate::entity::{Entity, EntityStatus, UploadSession};
use crate::error::{Result, StewardError};
use crate::validation::ValidationRun;

use super::{AuditQuery, AuditSink, EntityFilter, RecordStore};

/// Every collection the store holds. This is also the snapshot file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct Collections {
    #[serde(default)]
    pub entities: IndexMap<String, Entity>,
    #[serde(default)]
    pub runs: Vec<ValidationRun>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub audit: Vec<AuditEvent>,
    #[serde(default)]
    pub uploads: Vec<UploadSession>,
}

/// Store keeping all collections in process memory.
///
/// Each trait method takes the lock once, so every mutation is atomic with
/// respect to every other call on the same store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(super) inner: RwLock<Collections>,
    /// Held for the whole of a snapshot save.
    pub(super) save_lock: Mutex<()>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entities.
    pub fn with_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut collections = Collections::default();
        for mut entity in entities {
            entity.refresh_normalized_name();
            collections.entities.insert(entity.id.clone(), entity);
        }
        Self::from_collections(collections)
    }

    pub(super) fn from_collections(collections: Collections) -> Self {
        Self {
            inner: RwLock::new(collections),
            save_lock: Mutex::new(()),
        }
    }

    /// Remove an entity. Runs, decisions and audit events referencing it stay.
    pub async fn remove_entity(&self, id: &str) -> Option<Entity> {
        self.inner.write().await.entities.shift_remove(id)
    }

}

fn newest_first<T: Clone>(
    items: &[T],
    limit: usize,
    keep: impl Fn(&T) -> bool,
    at: impl Fn(&T) -> chrono::DateTime<Utc>,
) -> Vec<T> {
    let mut selected: Vec<T> = items.iter().rev().filter(|i| keep(*i)).cloned().collect();
    // Stable: equal timestamps keep reverse-insertion order.
    selected.sort_by(|a, b| at(b).cmp(&at(a)));
    selected.truncate(limit);
    selected
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_entity(&self, id: &str) -> Result<Option<Entity>> {
        Ok(self.inner.read().await.entities.get(id).cloned())
    }

    async fn put_entity(&self, mut entity: Entity) -> Result<()> {
        if entity.id.trim().is_empty() {
            return Err(StewardError::InvalidInput(
                "entity identifier must not be empty".to_string(),
            ));
        }
        entity.refresh_normalized_name();
        entity.updated_at = Utc::now();
        self.inner
            .write()
            .await
            .entities
            .insert(entity.id.clone(), entity);
        Ok(())
    }

    async fn list_entities(&self, filter: &EntityFilter) -> Result<Vec<Entity>> {
        let guard = self.inner.read().await;
        let mut matching: Vec<&Entity> = guard
            .entities
            .values()
            .filter(|e| filter.status.is_none_or(|s| e.status == s))
            .collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(matching
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count_credential_holders(
        &self,
        jurisdiction: &str,
        number: &str,
        excluding: &str,
    ) -> Result<usize> {
        let guard = self.inner.read().await;
        Ok(guard
            .entities
            .values()
            .filter(|e| e.id != excluding)
            .filter(|e| {
                e.credentials.iter().any(|c| {
                    c.jurisdiction.as_deref() == Some(jurisdiction)
                        && c.number.as_deref() == Some(number)
                })
            })
            .count())
    }

    async fn count_normalized_name(&self, normalized: &str, excluding: &str) -> Result<usize> {
        let guard = self.inner.read().await;
        Ok(guard
            .entities
            .values()
            .filter(|e| e.id != excluding && e.normalized_name == normalized)
            .count())
    }

    async fn set_status(&self, id: &str, status: EntityStatus) -> Result<()> {
        let mut guard = self.inner.write().await;
        let entity = guard
            .entities
            .get_mut(id)
            .ok_or_else(|| StewardError::entity_not_found(id))?;
        entity.status = status;
        entity.updated_at = Utc::now();
        Ok(())
    }

    async fn set_quality_score(&self, id: &str, score: f64) -> Result<()> {
        let mut guard = self.inner.write().await;
        let entity = guard
            .entities
            .get_mut(id)
            .ok_or_else(|| StewardError::entity_not_found(id))?;
        entity.quality_score = score;
        entity.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_run(&self, run: ValidationRun) -> Result<()> {
        self.inner.write().await.runs.push(run);
        Ok(())
    }

    async fn runs_for(&self, entity_id: &str, limit: usize) -> Result<Vec<ValidationRun>> {
        let guard = self.inner.read().await;
        Ok(newest_first(
            &guard.runs,
            limit,
            |r| r.entity_id == entity_id,
            |r| r.created_at,
        ))
    }

    async fn insert_decision(&self, decision: Decision) -> Result<()> {
        self.inner.write().await.decisions.push(decision);
        Ok(())
    }

    async fn decisions_for(&self, entity_id: &str, limit: usize) -> Result<Vec<Decision>> {
        let guard = self.inner.read().await;
        Ok(newest_first(
            &guard.decisions,
            limit,
            |d| d.entity_id == entity_id,
            |d| d.decided_at,
        ))
    }

    async fn insert_upload(&self, session: UploadSession) -> Result<()> {
        self.inner.write().await.uploads.push(session);
        Ok(())
    }

    async fn uploads(&self, limit: usize) -> Result<Vec<UploadSession>> {
        let guard = self.inner.read().await;
        Ok(newest_first(&guard.uploads, limit, |_| true, |u| u.started_at))
    }
}

#[async_trait]
impl AuditSink for MemoryStore {
    async fn append(&self, event: AuditEvent) -> Result<()> {
        self.inner.write().await.audit.push(event);
        Ok(())
    }

    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEvent>> {
        let guard = self.inner.read().await;
        Ok(newest_first(
            &guard.audit,
            query.limit,
            |e| query.matches(e),
            |e| e.at,
        ))
    }
}
