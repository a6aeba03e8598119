use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::access::Actor;
use crate::error::Result;
use crate::store::{AuditQuery, AuditSink};

use super::event::{AuditAction, AuditEvent, RequestMetadata};

/// Result-size limits for audit queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Limit used by entity and actor queries when the caller gives none.
    pub default_limit: usize,
    /// Limit used by period queries when the caller gives none.
    pub period_limit: usize,
    /// Hard ceiling on any query.
    pub max_limit: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            period_limit: 100,
            max_limit: 500,
        }
    }
}

/// Writes and reads audit events through an [`AuditSink`].
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
    config: AuditConfig,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>, config: AuditConfig) -> Self {
        Self { sink, config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Append one event. Never fails; a sink error is logged and dropped.
    pub async fn record(
        &self,
        actor: &Actor,
        action: AuditAction,
        entity_id: Option<&str>,
        metadata: &RequestMetadata,
        details: Value,
    ) {
        let event = AuditEvent {
            id: Uuid::new_v4().to_string(),
            actor: actor.username.clone(),
            role: actor.role,
            action,
            entity_id: entity_id.map(str::to_string),
            metadata: metadata.clone(),
            details,
            at: Utc::now(),
        };

        if let Err(e) = self.sink.append(event).await {
            tracing::warn!(
                actor = %actor.username,
                action = %action,
                entity_id = entity_id.unwrap_or("-"),
                error = %e,
                "Audit write failed"
            );
        }
    }

    /// Events for one entity, most recent first.
    pub async fn query_by_entity(&self, entity_id: &str, limit: Option<usize>) -> Result<Vec<AuditEvent>> {
        let limit = self.clamp(limit, self.config.default_limit);
        self.sink.query(&AuditQuery::for_entity(entity_id, limit)).await
    }

    /// Events by one actor, most recent first.
    pub async fn query_by_actor(&self, actor: &str, limit: Option<usize>) -> Result<Vec<AuditEvent>> {
        let limit = self.clamp(limit, self.config.default_limit);
        self.sink.query(&AuditQuery::for_actor(actor, limit)).await
    }

    /// Events within `[from, to]`, most recent first.
    pub async fn query_by_period(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<AuditEvent>> {
        let limit = self.clamp(limit, self.config.period_limit);
        self.sink.query(&AuditQuery::for_period(from, to, limit)).await
    }

    fn clamp(&self, requested: Option<usize>, default: usize) -> usize {
        requested.unwrap_or(default).min(self.config.max_limit)
    }
}
