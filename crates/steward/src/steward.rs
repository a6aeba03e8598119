//! Main Steward struct and public API.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::access::{AccessPolicy, Actor, Permission};
use crate::audit::{AuditAction, AuditEvent, AuditRecorder, RequestMetadata};
use crate::config::StewardConfig;
use crate::decision::{Decision, DecisionEngine, DecisionInput};
use crate::entity::{
    Entity, EntityStatus, IngestSummary, UploadSession, UploadStatus, entity_from_record,
};
use crate::error::{Result, StewardError};
use crate::report::{SummaryFilter, SummaryReport, summarize};
use crate::store::{AuditSink, EntityFilter, MemoryStore, RecordStore};
use crate::validation::{
    RuleCatalog, RuleInfo, RuleResult, ScoringEngine, Severity, ValidationResult, ValidationRun,
};

/// Decisions shown alongside an entity.
pub const VIEW_DECISION_LIMIT: usize = 10;
/// Audit events included in an entity report.
pub const REPORT_AUDIT_LIMIT: usize = 50;
/// Upload sessions listed when no limit is given.
pub const UPLOAD_HISTORY_LIMIT: usize = 20;

/// Who is asking, and from where.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub actor: Actor,
    pub metadata: RequestMetadata,
}

impl RequestContext {
    pub fn new(actor: Actor, metadata: RequestMetadata) -> Self {
        Self { actor, metadata }
    }

    /// A context for local tooling with no network caller.
    pub fn local(actor: Actor) -> Self {
        Self::new(actor, RequestMetadata::new("local", "steward-cli"))
    }
}

/// An entity with its latest validation and recent decisions.
#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub entity: Entity,
    pub validation: Option<ValidationRun>,
    pub decisions: Vec<Decision>,
}

/// Two entities side by side.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub a: Entity,
    pub b: Entity,
}

/// Headline fields of an entity in a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportHeader {
    pub id: String,
    pub name: String,
    pub primary_credential: String,
    pub status: EntityStatus,
}

/// Consolidated export of one entity's stewardship state.
#[derive(Debug, Clone, Serialize)]
pub struct EntityReport {
    pub entity: ReportHeader,
    pub score: f64,
    /// Failing error-severity rules from the latest run.
    pub errors: Vec<RuleResult>,
    /// Failing warning-severity rules from the latest run.
    pub warnings: Vec<RuleResult>,
    pub decisions: Vec<Decision>,
    pub audit: Vec<AuditEvent>,
}

/// The stewardship service: scoring, decisions and audit over one store.
pub struct Steward {
    store: Arc<dyn RecordStore>,
    scoring: ScoringEngine,
    decisions: DecisionEngine,
    audit: AuditRecorder,
    policy: AccessPolicy,
    config: StewardConfig,
}

impl Steward {
    /// Wire the engines over a record store and an audit sink.
    pub fn new(store: Arc<dyn RecordStore>, sink: Arc<dyn AuditSink>, config: StewardConfig) -> Self {
        let scoring = ScoringEngine::new(RuleCatalog::standard(&config.rules), Arc::clone(&store));
        let decisions = DecisionEngine::new(Arc::clone(&store), config.decisions.clone());
        let audit = AuditRecorder::new(sink, config.audit.clone());
        let policy = AccessPolicy::new(config.permissions.clone());

        Self {
            store,
            scoring,
            decisions,
            audit,
            policy,
            config,
        }
    }

    /// Use one in-memory store for both records and audit events.
    pub fn in_memory(store: Arc<MemoryStore>, config: StewardConfig) -> Self {
        Self::new(store.clone(), store, config)
    }

    /// Replace the rule catalog.
    pub fn with_catalog(mut self, catalog: RuleCatalog) -> Self {
        self.scoring = ScoringEngine::new(catalog, Arc::clone(&self.store));
        self
    }

    pub fn config(&self) -> &StewardConfig {
        &self.config
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> Vec<RuleInfo> {
        self.scoring.catalog().describe()
    }

    /// Upsert a batch of upstream records. Bad records are counted, not fatal.
    ///
    /// Every batch leaves an [`UploadSession`] in the store, including one
    /// cut short by a store failure.
    pub async fn ingest(
        &self,
        ctx: &RequestContext,
        source: &str,
        records: Vec<Value>,
    ) -> Result<IngestSummary> {
        self.policy.authorize(ctx.actor.role, Permission::UploadData)?;

        let started_at = Utc::now();
        let mut summary = IngestSummary {
            session_id: Uuid::new_v4().to_string(),
            ..IngestSummary::default()
        };
        let outcome = self.upsert_records(records, &mut summary).await;

        let mut session = UploadSession {
            id: summary.session_id.clone(),
            user: ctx.actor.username.clone(),
            source: source.to_string(),
            status: UploadStatus::Completed,
            processed: summary.processed,
            errors: summary.errors,
            log: summary.log.clone(),
            started_at,
            finished_at: Utc::now(),
        };

        if let Err(e) = outcome {
            session.status = UploadStatus::Failed;
            session.log.push(e.to_string());
            if let Err(store_err) = self.store.insert_upload(session).await {
                tracing::warn!(error = %store_err, "Failed to record upload session");
            }
            return Err(e);
        }
        self.store.insert_upload(session).await?;

        tracing::info!(
            session_id = %summary.session_id,
            source,
            processed = summary.processed,
            errors = summary.errors,
            "Ingested records"
        );
        self.audit
            .record(
                &ctx.actor,
                AuditAction::UploadData,
                None,
                &ctx.metadata,
                json!({
                    "session_id": summary.session_id,
                    "source": source,
                    "processed": summary.processed,
                    "errors": summary.errors,
                }),
            )
            .await;

        Ok(summary)
    }

    async fn upsert_records(&self, records: Vec<Value>, summary: &mut IngestSummary) -> Result<()> {
        for record in records {
            match entity_from_record(record) {
                Ok(entity) => {
                    self.store.put_entity(entity).await?;
                    summary.processed += 1;
                }
                Err(e) => {
                    summary.errors += 1;
                    summary.log.push(e.to_string());
                }
            }
        }
        Ok(())
    }

    /// Past upload batches, most recent first.
    pub async fn upload_history(
        &self,
        ctx: &RequestContext,
        limit: Option<usize>,
    ) -> Result<Vec<UploadSession>> {
        self.policy.authorize(ctx.actor.role, Permission::UploadData)?;
        self.store
            .uploads(limit.unwrap_or(UPLOAD_HISTORY_LIMIT))
            .await
    }

    /// Scan entities, most recently updated first.
    pub async fn list(&self, ctx: &RequestContext, filter: &EntityFilter) -> Result<Vec<Entity>> {
        self.policy.authorize(ctx.actor.role, Permission::SearchEntities)?;

        let entities = self.store.list_entities(filter).await?;
        self.audit
            .record(
                &ctx.actor,
                AuditAction::Search,
                None,
                &ctx.metadata,
                json!({
                    "status": filter.status.map(|s| s.as_str()),
                    "results": entities.len(),
                }),
            )
            .await;

        Ok(entities)
    }

    /// One entity with its latest validation and recent decisions.
    pub async fn view(&self, ctx: &RequestContext, entity_id: &str) -> Result<EntityView> {
        self.policy.authorize(ctx.actor.role, Permission::ViewEntity)?;

        let entity = self.require_entity(entity_id).await?;
        let validation = self.scoring.last_run(entity_id).await?;
        let decisions = self.decisions.history(entity_id, VIEW_DECISION_LIMIT).await?;

        self.audit
            .record(&ctx.actor, AuditAction::ViewEntity, Some(entity_id), &ctx.metadata, json!({}))
            .await;

        Ok(EntityView {
            entity,
            validation,
            decisions,
        })
    }

    /// Run the rule catalog and persist the result.
    pub async fn validate(&self, ctx: &RequestContext, entity_id: &str) -> Result<ValidationResult> {
        self.policy.authorize(ctx.actor.role, Permission::ValidateEntity)?;

        let result = self.scoring.validate(entity_id).await?;
        self.audit
            .record(
                &ctx.actor,
                AuditAction::UpdateEntity,
                Some(entity_id),
                &ctx.metadata,
                json!({ "action": "validate", "score": result.score }),
            )
            .await;

        Ok(result)
    }

    /// Record a decision and apply its status.
    pub async fn record_decision(
        &self,
        ctx: &RequestContext,
        entity_id: &str,
        input: DecisionInput,
    ) -> Result<Decision> {
        self.policy.authorize(ctx.actor.role, Permission::ValidateEntity)?;

        let decision = self.decisions.record(entity_id, &ctx.actor, input).await?;
        self.audit
            .record(
                &ctx.actor,
                AuditAction::Decision,
                Some(entity_id),
                &ctx.metadata,
                json!({
                    "decision_id": decision.id,
                    "decision_type": decision.decision_type,
                    "linked_entity_id": decision.linked_entity_id,
                    "comments": decision.comments,
                    "item_details": decision.selection.as_ref().and_then(|s| s.details()),
                }),
            )
            .await;

        Ok(decision)
    }

    /// Both entities, or `NotFound` naming the first one missing.
    pub async fn compare(&self, ctx: &RequestContext, a: &str, b: &str) -> Result<Comparison> {
        self.policy.authorize(ctx.actor.role, Permission::CompareEntities)?;

        let (first, second) = tokio::try_join!(self.require_entity(a), self.require_entity(b))?;
        self.audit
            .record(
                &ctx.actor,
                AuditAction::Compare,
                None,
                &ctx.metadata,
                json!({ "id_a": a, "id_b": b }),
            )
            .await;

        Ok(Comparison {
            a: first,
            b: second,
        })
    }

    /// Consolidated report of one entity.
    pub async fn report(&self, ctx: &RequestContext, entity_id: &str) -> Result<EntityReport> {
        self.policy.authorize(ctx.actor.role, Permission::ExportEntity)?;

        let entity = self.require_entity(entity_id).await?;
        let latest = self.scoring.last_run(entity_id).await?;
        let decisions = self.decisions.history(entity_id, usize::MAX).await?;
        let audit = match self
            .audit
            .query_by_entity(entity_id, Some(REPORT_AUDIT_LIMIT))
            .await
        {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(entity_id, error = %e, "Audit query failed, report has no audit trail");
                Vec::new()
            }
        };

        let failing = |severity: Severity| -> Vec<RuleResult> {
            latest
                .iter()
                .flat_map(|run| run.rule_results.iter())
                .filter(|r| !r.passed() && r.severity == severity)
                .cloned()
                .collect()
        };
        let errors = failing(Severity::Error);
        let warnings = failing(Severity::Warning);

        self.audit
            .record(
                &ctx.actor,
                AuditAction::Export,
                Some(entity_id),
                &ctx.metadata,
                json!({ "format": "json" }),
            )
            .await;

        Ok(EntityReport {
            entity: ReportHeader {
                id: entity.id.clone(),
                name: entity.name.clone(),
                primary_credential: entity.primary_credential(),
                status: entity.status,
            },
            score: entity.quality_score,
            errors,
            warnings,
            decisions,
            audit,
        })
    }

    /// Counts and mean scores by status, and entities by score band.
    pub async fn summary(&self, ctx: &RequestContext, filter: &SummaryFilter) -> Result<SummaryReport> {
        self.policy.authorize(ctx.actor.role, Permission::ExportEntity)?;
        filter.check()?;

        let scan = EntityFilter {
            status: filter.status,
            ..EntityFilter::default()
        };
        let entities = self.store.list_entities(&scan).await?;
        let report = summarize(entities.iter().filter(|e| filter.matches(e)));

        self.audit
            .record(
                &ctx.actor,
                AuditAction::Export,
                None,
                &ctx.metadata,
                json!({
                    "format": "summary",
                    "status": filter.status.map(|s| s.as_str()),
                    "min_score": filter.min_score,
                    "max_score": filter.max_score,
                    "total": report.total,
                }),
            )
            .await;

        Ok(report)
    }

    /// Audit events for one entity, most recent first.
    pub async fn audit_for(
        &self,
        ctx: &RequestContext,
        entity_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<AuditEvent>> {
        self.policy.authorize(ctx.actor.role, Permission::ViewEntity)?;
        self.audit.query_by_entity(entity_id, limit).await
    }

    /// The audit recorder, for actor and period queries.
    pub fn audit(&self) -> &AuditRecorder {
        &self.audit
    }

    async fn require_entity(&self, entity_id: &str) -> Result<Entity> {
        self.store
            .get_entity(entity_id)
            .await?
            .ok_or_else(|| StewardError::entity_not_found(entity_id))
    }
}
