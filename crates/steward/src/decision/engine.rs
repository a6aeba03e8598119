//! Recording decisions and applying their status transitions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Actor;
use crate::error::{Result, StewardError};
use crate::store::RecordStore;

use super::model::{Decision, DecisionType, ItemSelection, SectionDetails, SectionIndices};
use super::selection::{merge_requested, resolve_selection};

/// Rules governing which decisions are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionPolicy {
    /// Refuse a `duplicate` decision that names no linked entity.
    pub require_link_for_duplicate: bool,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            require_link_for_duplicate: true,
        }
    }
}

/// A decision as submitted by a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionInput {
    pub decision_type: String,
    #[serde(default)]
    pub linked_entity_id: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    /// Raw 1-based positions per section.
    #[serde(default)]
    pub selected_items: Option<SectionIndices>,
    /// Client-side resolved items. Only the positions are trusted.
    #[serde(default)]
    pub item_details: Option<SectionDetails>,
}

impl DecisionInput {
    pub fn new(decision_type: impl Into<String>) -> Self {
        Self {
            decision_type: decision_type.into(),
            ..Self::default()
        }
    }

    pub fn linked_to(mut self, entity_id: impl Into<String>) -> Self {
        self.linked_entity_id = Some(entity_id.into());
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    pub fn with_selected(mut self, indices: SectionIndices) -> Self {
        self.selected_items = Some(indices);
        self
    }
}

/// Per-entity async locks. Entries are dropped once nobody holds them.
#[derive(Default)]
struct EntityLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl EntityLocks {
    fn handle(&self, entity_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(entity_id.to_string()).or_default())
    }
}

/// Records decisions and moves entities through their status lifecycle.
///
/// Decisions on the same entity are serialized within this process, so the
/// entity's final status always matches its newest decision.
#[derive(Clone)]
pub struct DecisionEngine {
    store: Arc<dyn RecordStore>,
    policy: DecisionPolicy,
    locks: Arc<EntityLocks>,
}

impl DecisionEngine {
    pub fn new(store: Arc<dyn RecordStore>, policy: DecisionPolicy) -> Self {
        Self {
            store,
            policy,
            locks: Arc::new(EntityLocks::default()),
        }
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Record one decision and apply its status.
    ///
    /// Input is checked before anything is written. The decision insert and
    /// the status update run on their own task, in that order.
    pub async fn record(&self, entity_id: &str, actor: &Actor, input: DecisionInput) -> Result<Decision> {
        let decision_type: DecisionType = input.decision_type.parse()?;
        let linked_entity_id = input
            .linked_entity_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        if decision_type == DecisionType::Duplicate
            && linked_entity_id.is_none()
            && self.policy.require_link_for_duplicate
        {
            return Err(StewardError::InvalidInput(
                "a duplicate decision must name the entity it duplicates".to_string(),
            ));
        }
        if linked_entity_id.as_deref() == Some(entity_id) {
            return Err(StewardError::InvalidInput(
                "an entity cannot be linked to itself".to_string(),
            ));
        }

        let guard = self.locks.handle(entity_id).lock_owned().await;

        let entity = self
            .store
            .get_entity(entity_id)
            .await?
            .ok_or_else(|| StewardError::entity_not_found(entity_id))?;

        if let Some(linked) = &linked_entity_id {
            if self.store.get_entity(linked).await?.is_none() {
                return Err(StewardError::NotFound {
                    kind: "Linked entity",
                    id: linked.clone(),
                });
            }
        }

        let requested = merge_requested(input.selected_items.as_ref(), input.item_details.as_ref());
        let resolved = resolve_selection(&entity, &requested)?;
        let selection = (!resolved.is_empty()).then_some(ItemSelection::Resolved(resolved));

        let decision = Decision {
            id: Uuid::new_v4().to_string(),
            entity_id: entity.id.clone(),
            actor: actor.username.clone(),
            role: actor.role,
            decided_at: Utc::now(),
            decision_type,
            linked_entity_id,
            comments: input.comments.unwrap_or_default(),
            selection,
        };

        let store = Arc::clone(&self.store);
        let record = decision.clone();
        let commit = tokio::spawn(async move {
            let _guard = guard;
            let status = record.applied_status();
            let entity_id = record.entity_id.clone();
            store.insert_decision(record).await?;
            store.set_status(&entity_id, status).await
        });
        commit
            .await
            .map_err(|e| StewardError::StoreUnavailable(format!("decision commit aborted: {}", e)))??;

        tracing::info!(
            entity_id = %decision.entity_id,
            decision_id = %decision.id,
            decision_type = %decision.decision_type,
            actor = %decision.actor,
            status = %decision.applied_status(),
            "Decision recorded"
        );

        Ok(decision)
    }

    /// Decisions for one entity, newest first.
    pub async fn history(&self, entity_id: &str, limit: usize) -> Result<Vec<Decision>> {
        self.store.decisions_for(entity_id, limit).await
    }
}
