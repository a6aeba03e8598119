//! Abstract record store and its in-memory implementation.
//!
//! The engines only ever talk to [`RecordStore`] and [`AuditSink`]. Every
//! mutation is a single-document update; nothing here needs a
//! multi-document transaction.

mod memory;
mod snapshot;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::audit::AuditEvent;
use crate::decision::Decision;
use crate::entity::{Entity, EntityStatus, UploadSession};
use crate::error::Result;
use crate::validation::ValidationRun;

pub use memory::MemoryStore;
pub use snapshot::snapshot_history_dir;

/// Filter for scanning entities.
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    /// Only entities in this status.
    pub status: Option<EntityStatus>,
    /// Maximum entities returned.
    pub limit: Option<usize>,
    /// Entities skipped before the first returned.
    pub offset: usize,
}

impl EntityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: EntityStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Query over the audit collection. Results are most-recent-first.
#[derive(Debug, Clone)]
pub struct AuditQuery {
    pub entity_id: Option<String>,
    pub actor: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: usize,
}

impl AuditQuery {
    pub fn for_entity(entity_id: impl Into<String>, limit: usize) -> Self {
        Self {
            entity_id: Some(entity_id.into()),
            actor: None,
            from: None,
            to: None,
            limit,
        }
    }

    pub fn for_actor(actor: impl Into<String>, limit: usize) -> Self {
        Self {
            entity_id: None,
            actor: Some(actor.into()),
            from: None,
            to: None,
            limit,
        }
    }

    pub fn for_period(from: DateTime<Utc>, to: DateTime<Utc>, limit: usize) -> Self {
        Self {
            entity_id: None,
            actor: None,
            from: Some(from),
            to: Some(to),
            limit,
        }
    }

    /// Check whether an event satisfies every set criterion.
    pub fn matches(&self, event: &AuditEvent) -> bool {
        self.entity_id
            .as_deref()
            .is_none_or(|id| event.entity_id.as_deref() == Some(id))
            && self.actor.as_deref().is_none_or(|actor| event.actor == actor)
            && self.from.is_none_or(|from| event.at >= from)
            && self.to.is_none_or(|to| event.at <= to)
    }
}

/// Entity, validation-run and decision collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup by external identifier.
    async fn get_entity(&self, id: &str) -> Result<Option<Entity>>;

    /// Insert or replace an entity keyed by its identifier.
    async fn put_entity(&self, entity: Entity) -> Result<()>;

    /// Filtered scan, most recently updated first.
    async fn list_entities(&self, filter: &EntityFilter) -> Result<Vec<Entity>>;

    /// Number of entities other than `excluding` carrying the given credential.
    async fn count_credential_holders(
        &self,
        jurisdiction: &str,
        number: &str,
        excluding: &str,
    ) -> Result<usize>;

    /// Number of entities other than `excluding` with this normalized name.
    async fn count_normalized_name(&self, normalized: &str, excluding: &str) -> Result<usize>;

    /// Atomically set the status field. `NotFound` if the entity is gone.
    async fn set_status(&self, id: &str, status: EntityStatus) -> Result<()>;

    /// Atomically set the quality score field. `NotFound` if the entity is gone.
    async fn set_quality_score(&self, id: &str, score: f64) -> Result<()>;

    /// Append a validation run. Runs are never updated.
    async fn insert_run(&self, run: ValidationRun) -> Result<()>;

    /// Runs for one entity, newest first.
    async fn runs_for(&self, entity_id: &str, limit: usize) -> Result<Vec<ValidationRun>>;

    /// The newest run for one entity.
    async fn latest_run(&self, entity_id: &str) -> Result<Option<ValidationRun>> {
        Ok(self.runs_for(entity_id, 1).await?.into_iter().next())
    }

    /// Append a decision. Decisions are never updated.
    async fn insert_decision(&self, decision: Decision) -> Result<()>;

    /// Decisions for one entity, newest first.
    async fn decisions_for(&self, entity_id: &str, limit: usize) -> Result<Vec<Decision>>;

    /// Append an upload session. Sessions are never updated.
    async fn insert_upload(&self, session: UploadSession) -> Result<()>;

    /// Upload sessions, most recently started first.
    async fn uploads(&self, limit: usize) -> Result<Vec<UploadSession>>;
}

/// Append-only audit collection.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, event: AuditEvent) -> Result<()>;

    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEvent>>;
}
