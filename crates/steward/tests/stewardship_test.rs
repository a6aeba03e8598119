//! End-to-end tests for scoring, decisions and audit through the Steward API.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use steward::audit::{AuditAction, AuditEvent, RequestMetadata};
use steward::decision::{
    Decision, DecisionEngine, DecisionInput, DecisionPolicy, Section, SectionIndices,
};
use steward::entity::{Address, Credential, Entity, EntityStatus, UploadSession, UploadStatus};
use steward::store::{AuditQuery, AuditSink, EntityFilter, MemoryStore, RecordStore};
use steward::validation::{RuleStatus, Severity, ValidationRun};
use steward::{
    Actor, RequestContext, Role, Steward, StewardConfig, StewardError, SummaryFilter,
};

/// Audit collection that is always down.
struct AuditOutage;

#[async_trait]
impl AuditSink for AuditOutage {
    async fn append(&self, _: AuditEvent) -> steward::Result<()> {
        Err(StewardError::StoreUnavailable("audit collection offline".into()))
    }

    async fn query(&self, _: &AuditQuery) -> steward::Result<Vec<AuditEvent>> {
        Err(StewardError::StoreUnavailable("audit collection offline".into()))
    }
}

/// Record store whose entity disappears as soon as a decision is written.
struct VanishingStore {
    inner: MemoryStore,
}

#[async_trait]
impl RecordStore for VanishingStore {
    async fn get_entity(&self, id: &str) -> steward::Result<Option<Entity>> {
        self.inner.get_entity(id).await
    }

    async fn put_entity(&self, entity: Entity) -> steward::Result<()> {
        self.inner.put_entity(entity).await
    }

    async fn list_entities(&self, filter: &EntityFilter) -> steward::Result<Vec<Entity>> {
        self.inner.list_entities(filter).await
    }

    async fn count_credential_holders(
        &self,
        jurisdiction: &str,
        number: &str,
        excluding: &str,
    ) -> steward::Result<usize> {
        self.inner
            .count_credential_holders(jurisdiction, number, excluding)
            .await
    }

    async fn count_normalized_name(&self, normalized: &str, excluding: &str) -> steward::Result<usize> {
        self.inner.count_normalized_name(normalized, excluding).await
    }

    async fn set_status(&self, id: &str, status: EntityStatus) -> steward::Result<()> {
        self.inner.set_status(id, status).await
    }

    async fn set_quality_score(&self, id: &str, score: f64) -> steward::Result<()> {
        self.inner.set_quality_score(id, score).await
    }

    async fn insert_run(&self, run: ValidationRun) -> steward::Result<()> {
        self.inner.insert_run(run).await
    }

    async fn runs_for(&self, entity_id: &str, limit: usize) -> steward::Result<Vec<ValidationRun>> {
        self.inner.runs_for(entity_id, limit).await
    }

    async fn insert_decision(&self, decision: Decision) -> steward::Result<()> {
        let entity_id = decision.entity_id.clone();
        self.inner.insert_decision(decision).await?;
        self.inner.remove_entity(&entity_id).await;
        Ok(())
    }

    async fn decisions_for(&self, entity_id: &str, limit: usize) -> steward::Result<Vec<Decision>> {
        self.inner.decisions_for(entity_id, limit).await
    }

    async fn insert_upload(&self, session: UploadSession) -> steward::Result<()> {
        self.inner.insert_upload(session).await
    }

    async fn uploads(&self, limit: usize) -> steward::Result<Vec<UploadSession>> {
        self.inner.uploads(limit).await
    }
}

fn complete_address() -> Address {
    Address {
        kind: Some("office".into()),
        street: Some("Av. Paulista".into()),
        number: Some("1000".into()),
        municipality: Some("Sao Paulo".into()),
        region: Some("SP".into()),
        postal_code: Some("01310-100".into()),
        ..Address::default()
    }
}

/// An entity that passes every standard rule.
fn clean_entity(id: &str, name: &str, number: &str) -> Entity {
    Entity::new(id, name)
        .with_credential(Credential::new("SP", number).with_status("ACTIVE"))
        .with_address(complete_address())
        .with_phone("11999998888")
        .with_email("contact@clinic.com")
}

fn ctx() -> RequestContext {
    RequestContext::new(
        Actor::new("maria", Role::Steward),
        RequestMetadata::new("10.0.0.7", "integration-test"),
    )
}

fn steward_over(entities: Vec<Entity>) -> (Arc<MemoryStore>, Steward) {
    let store = Arc::new(MemoryStore::with_entities(entities));
    let steward = Steward::in_memory(store.clone(), StewardConfig::default());
    (store, steward)
}

// =============================================================================
// Scoring
// =============================================================================

#[tokio::test]
async fn test_clean_entity_scores_one() {
    let (store, steward) = steward_over(vec![clean_entity("HCP-1", "Ana Lima", "111")]);

    let result = steward.validate(&ctx(), "HCP-1").await.unwrap();

    assert_eq!(result.score, 1.0);
    assert_eq!(result.summary.total, 7);
    assert_eq!(result.summary.passed, 7);
    assert_eq!(result.summary.errors + result.summary.warnings, 0);

    let entity = store.get_entity("HCP-1").await.unwrap().unwrap();
    assert_eq!(entity.quality_score, 1.0);
    assert_eq!(store.runs_for("HCP-1", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_revalidation_is_stable() {
    let (store, steward) = steward_over(vec![
        clean_entity("HCP-1", "Ana Lima", "111").with_email("invalido-email"),
    ]);

    let first = steward.validate(&ctx(), "HCP-1").await.unwrap();
    let second = steward.validate(&ctx(), "HCP-1").await.unwrap();

    assert_eq!(first.score, second.score);
    assert_eq!(first.rule_results, second.rule_results);
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(store.runs_for("HCP-1", 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_shared_credential_fails_uniqueness() {
    let (_, steward) = steward_over(vec![
        clean_entity("HCP-1", "Ana Lima", "123456"),
        clean_entity("HCP-2", "Bruno Costa", "123456"),
    ]);

    let result = steward.validate(&ctx(), "HCP-1").await.unwrap();

    let unique = result
        .rule_results
        .iter()
        .find(|r| r.rule_id == "unique-credential-per-entity")
        .unwrap();
    assert_eq!(unique.status, RuleStatus::Fail);
    assert_eq!(unique.severity, Severity::Error);
    assert!(unique.detail.contains("123456/SP"));
    assert_eq!(result.summary.passed, 6);
    assert_eq!(result.summary.errors, 1);
    assert_eq!(result.score, 0.81);
}

#[tokio::test]
async fn test_email_format_scenarios() {
    let (_, steward) = steward_over(vec![
        Entity::new("BAD", "Carla Dias")
            .with_credential(Credential::new("RJ", "1"))
            .with_email("invalido-email"),
        Entity::new("GOOD", "Davi Reis")
            .with_credential(Credential::new("RJ", "2"))
            .with_email("a@b.com"),
    ]);

    let email_status = |result: &steward::ValidationResult| {
        result
            .rule_results
            .iter()
            .find(|r| r.rule_id == "email-format")
            .map(|r| (r.status, r.severity))
            .unwrap()
    };

    let bad = steward.validate(&ctx(), "BAD").await.unwrap();
    assert_eq!(email_status(&bad), (RuleStatus::Fail, Severity::Error));

    let good = steward.validate(&ctx(), "GOOD").await.unwrap();
    assert_eq!(email_status(&good).0, RuleStatus::Pass);
}

#[tokio::test]
async fn test_rule_results_follow_catalog_order() {
    let (_, steward) = steward_over(vec![clean_entity("HCP-1", "Ana Lima", "111")]);

    let result = steward.validate(&ctx(), "HCP-1").await.unwrap();
    let ids: Vec<String> = result.rule_results.iter().map(|r| r.rule_id.clone()).collect();
    let catalog: Vec<String> = steward.rules().into_iter().map(|r| r.id).collect();

    assert_eq!(ids, catalog);
}

#[tokio::test]
async fn test_validate_missing_entity_is_not_found() {
    let (_, steward) = steward_over(vec![]);
    let err = steward.validate(&ctx(), "ghost").await.unwrap_err();
    assert!(err.is_not_found());
}

// =============================================================================
// Decisions
// =============================================================================

#[tokio::test]
async fn test_each_decision_type_sets_its_status() {
    let cases = [
        ("validate", EntityStatus::Validated),
        ("reject", EntityStatus::Rejected),
        ("correct", EntityStatus::NeedsCorrection),
        ("duplicate", EntityStatus::Duplicate),
        ("unrelated", EntityStatus::ToReview),
    ];

    for (decision_type, expected) in cases {
        let (store, steward) = steward_over(vec![
            clean_entity("A", "Ana Lima", "1"),
            clean_entity("B", "Bruno Costa", "2"),
        ]);
        store.set_status("A", EntityStatus::Rejected).await.unwrap();
        if expected == EntityStatus::Rejected {
            store.set_status("A", EntityStatus::Validated).await.unwrap();
        }

        let input = DecisionInput::new(decision_type).linked_to("B");
        steward.record_decision(&ctx(), "A", input).await.unwrap();

        let entity = store.get_entity("A").await.unwrap().unwrap();
        assert_eq!(entity.status, expected, "decision type {}", decision_type);
    }
}

#[tokio::test]
async fn test_decisions_are_additive() {
    let (store, steward) = steward_over(vec![clean_entity("A", "Ana Lima", "1")]);

    let first = steward
        .record_decision(&ctx(), "A", DecisionInput::new("reject").with_comments("wrong CRM"))
        .await
        .unwrap();
    let second = steward
        .record_decision(&ctx(), "A", DecisionInput::new("validate"))
        .await
        .unwrap();

    let history = store.decisions_for("A", 10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], second);
    assert_eq!(history[1], first);
    assert_eq!(history[1].comments, "wrong CRM");

    let entity = store.get_entity("A").await.unwrap().unwrap();
    assert_eq!(entity.status, EntityStatus::Validated);
}

#[tokio::test]
async fn test_selection_snapshot_survives_reordering() {
    let entity = Entity::new("A", "Ana Lima")
        .with_credential(Credential::new("SP", "1"))
        .with_phone("11999998888")
        .with_phone("21988887777")
        .with_phone("3133334444");
    let (store, steward) = steward_over(vec![entity]);

    let mut indices = SectionIndices::new();
    indices.insert(Section::Phones, vec![2]);
    let decision = steward
        .record_decision(&ctx(), "A", DecisionInput::new("correct").with_selected(indices))
        .await
        .unwrap();

    let mut reordered = store.get_entity("A").await.unwrap().unwrap();
    reordered.phones.reverse();
    store.put_entity(reordered).await.unwrap();

    let stored = &store.decisions_for("A", 1).await.unwrap()[0];
    assert_eq!(stored.id, decision.id);
    let details = stored.selection.as_ref().and_then(|s| s.details()).unwrap();
    assert_eq!(details[&Section::Phones][0].value, "21988887777");
    assert_eq!(details[&Section::Phones][0].label, "Phone #2: 21988887777");
}

#[tokio::test]
async fn test_entity_deleted_mid_decision_keeps_decision_record() {
    let store = Arc::new(VanishingStore {
        inner: MemoryStore::with_entities(vec![clean_entity("A", "Ana Lima", "1")]),
    });
    let engine = DecisionEngine::new(store.clone(), DecisionPolicy::default());

    let err = engine
        .record("A", &Actor::new("maria", Role::Steward), DecisionInput::new("reject"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let history = store.decisions_for("A", 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].decision_type.as_str(), "reject");
    assert!(store.get_entity("A").await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_decision_type_leaves_no_trace() {
    let (store, steward) = steward_over(vec![clean_entity("A", "Ana Lima", "1")]);

    let err = steward
        .record_decision(&ctx(), "A", DecisionInput::new("approve"))
        .await
        .unwrap_err();

    assert!(matches!(err, StewardError::InvalidInput(_)));
    assert!(store.decisions_for("A", 10).await.unwrap().is_empty());
    assert!(steward.audit_for(&ctx(), "A", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_decisions_end_on_newest() {
    let (store, steward) = steward_over(vec![clean_entity("A", "Ana Lima", "1")]);
    let steward = Arc::new(steward);

    let handles: Vec<_> = (0..20)
        .map(|n| {
            let steward = Arc::clone(&steward);
            tokio::spawn(async move {
                let decision_type = if n % 2 == 0 { "validate" } else { "reject" };
                steward
                    .record_decision(&ctx(), "A", DecisionInput::new(decision_type))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let history = store.decisions_for("A", 100).await.unwrap();
    assert_eq!(history.len(), 20);

    let entity = store.get_entity("A").await.unwrap().unwrap();
    assert_eq!(entity.status, history[0].applied_status());
}

// =============================================================================
// Audit
// =============================================================================

#[tokio::test]
async fn test_audit_outage_does_not_fail_operations() {
    let store = Arc::new(MemoryStore::with_entities(vec![clean_entity("A", "Ana Lima", "1")]));
    let steward = Steward::new(store.clone(), Arc::new(AuditOutage), StewardConfig::default());

    let result = steward.validate(&ctx(), "A").await.unwrap();
    assert_eq!(result.score, 1.0);

    steward
        .record_decision(&ctx(), "A", DecisionInput::new("validate"))
        .await
        .unwrap();
    let entity = store.get_entity("A").await.unwrap().unwrap();
    assert_eq!(entity.status, EntityStatus::Validated);

    let err = steward.audit_for(&ctx(), "A", None).await.unwrap_err();
    assert!(matches!(err, StewardError::StoreUnavailable(_)));

    let report = steward.report(&ctx(), "A").await.unwrap();
    assert_eq!(report.score, 1.0);
    assert!(report.audit.is_empty());
}

#[tokio::test]
async fn test_operations_are_audited_newest_first() {
    let (_, steward) = steward_over(vec![
        clean_entity("A", "Ana Lima", "1"),
        clean_entity("B", "Bruno Costa", "2"),
    ]);

    steward.validate(&ctx(), "A").await.unwrap();
    steward
        .record_decision(&ctx(), "A", DecisionInput::new("validate"))
        .await
        .unwrap();
    steward.view(&ctx(), "A").await.unwrap();
    steward.compare(&ctx(), "A", "B").await.unwrap();

    let events = steward.audit_for(&ctx(), "A", None).await.unwrap();
    let actions: Vec<AuditAction> = events.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![AuditAction::ViewEntity, AuditAction::Decision, AuditAction::UpdateEntity]
    );
    assert_eq!(events[2].details, json!({ "action": "validate", "score": 1.0 }));
    assert_eq!(events[0].metadata.client, "integration-test");

    let mine = steward.audit().query_by_actor("maria", None).await.unwrap();
    assert_eq!(mine[0].action, AuditAction::Compare);
    assert_eq!(mine[0].details["id_b"], "B");
}

// =============================================================================
// Views, reports and access
// =============================================================================

#[tokio::test]
async fn test_view_includes_latest_run_and_decisions() {
    let (_, steward) = steward_over(vec![clean_entity("A", "Ana Lima", "1")]);

    let before = steward.view(&ctx(), "A").await.unwrap();
    assert!(before.validation.is_none());
    assert!(before.decisions.is_empty());

    let run = steward.validate(&ctx(), "A").await.unwrap();
    steward
        .record_decision(&ctx(), "A", DecisionInput::new("validate"))
        .await
        .unwrap();

    let after = steward.view(&ctx(), "A").await.unwrap();
    assert_eq!(after.validation.unwrap().id, run.run_id);
    assert_eq!(after.decisions.len(), 1);
    assert_eq!(after.entity.status, EntityStatus::Validated);
}

#[tokio::test]
async fn test_compare_requires_both() {
    let (_, steward) = steward_over(vec![clean_entity("A", "Ana Lima", "1")]);

    let err = steward.compare(&ctx(), "A", "Z").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Z"));
}

#[tokio::test]
async fn test_report_splits_errors_and_warnings() {
    let entity = Entity::new("A", "Ana Lima")
        .with_credential(Credential::new("SP", "1").with_status("CANCELLED"))
        .with_email("invalido-email");
    let (_, steward) = steward_over(vec![entity]);

    steward.validate(&ctx(), "A").await.unwrap();
    let report = steward.report(&ctx(), "A").await.unwrap();

    assert_eq!(report.entity.primary_credential, "1/SP");
    let errors: Vec<&str> = report.errors.iter().map(|r| r.rule_id.as_str()).collect();
    let warnings: Vec<&str> = report.warnings.iter().map(|r| r.rule_id.as_str()).collect();
    assert_eq!(errors, vec!["email-format"]);
    assert_eq!(warnings, vec!["credential-status"]);
    assert_eq!(report.audit[0].action, AuditAction::UpdateEntity);
}

#[tokio::test]
async fn test_viewer_cannot_validate_or_decide() {
    let (store, steward) = steward_over(vec![clean_entity("A", "Ana Lima", "1")]);
    let viewer = RequestContext::local(Actor::new("vera", Role::Viewer));

    let err = steward.validate(&viewer, "A").await.unwrap_err();
    assert!(matches!(err, StewardError::Forbidden(_)));
    let err = steward
        .record_decision(&viewer, "A", DecisionInput::new("validate"))
        .await
        .unwrap_err();
    assert!(matches!(err, StewardError::Forbidden(_)));

    assert!(store.runs_for("A", 10).await.unwrap().is_empty());
    steward.view(&viewer, "A").await.unwrap();
}

#[tokio::test]
async fn test_ingest_counts_bad_records() {
    let (store, steward) = steward_over(vec![]);
    let admin = RequestContext::local(Actor::new("root", Role::Admin));

    let summary = steward
        .ingest(
            &admin,
            "hcps.json",
            vec![
                json!({"id": "A", "name": "Ana Lima", "score": 72}),
                json!({"_id": "B", "name": "Bruno Costa"}),
                json!({"name": "Nobody"}),
            ],
        )
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(store.get_entity("A").await.unwrap().unwrap().quality_score, 0.72);

    let listed = steward
        .list(&admin, &EntityFilter::new().with_status(EntityStatus::ToReview))
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);

    let err = steward.ingest(&ctx(), "hcps.json", vec![]).await.unwrap_err();
    assert!(matches!(err, StewardError::Forbidden(_)));

    let history = steward.upload_history(&admin, None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, summary.session_id);
    assert_eq!(history[0].user, "root");
    assert_eq!(history[0].source, "hcps.json");
    assert_eq!(history[0].status, UploadStatus::Completed);
    assert_eq!((history[0].processed, history[0].errors), (2, 1));
    assert_eq!(history[0].log.len(), 1);
    assert!(history[0].finished_at >= history[0].started_at);

    let err = steward.upload_history(&ctx(), None).await.unwrap_err();
    assert!(matches!(err, StewardError::Forbidden(_)));
}

#[tokio::test]
async fn test_ingest_rejects_out_of_range_quality_score() {
    let (store, steward) = steward_over(vec![]);
    let admin = RequestContext::local(Actor::new("root", Role::Admin));

    let summary = steward
        .ingest(
            &admin,
            "hcps.json",
            vec![json!({"id": "X", "name": "Ana Lima", "quality_score": 7.5})],
        )
        .await
        .unwrap();

    assert_eq!((summary.processed, summary.errors), (0, 1));
    assert!(store.get_entity("X").await.unwrap().is_none());
}

#[tokio::test]
async fn test_summary_by_status_and_score() {
    let (_, steward) = steward_over(vec![
        clean_entity("A", "Ana Lima", "1"),
        clean_entity("B", "Bruno Costa", "2"),
        Entity::new("C", "Carla Dias"),
    ]);
    steward.validate(&ctx(), "A").await.unwrap();
    steward.validate(&ctx(), "C").await.unwrap();
    steward
        .record_decision(&ctx(), "A", DecisionInput::new("validate"))
        .await
        .unwrap();

    let report = steward.summary(&ctx(), &SummaryFilter::default()).await.unwrap();
    assert_eq!(report.total, 3);
    let by_status: Vec<_> = report
        .by_status
        .iter()
        .map(|s| (s.status, s.count))
        .collect();
    assert_eq!(
        by_status,
        vec![(EntityStatus::ToReview, 2), (EntityStatus::Validated, 1)]
    );
    assert_eq!(report.by_status[1].average_score, 1.0);
    let top = report.by_score_range.last().unwrap();
    assert_eq!(top.entity_ids, vec!["A"]);

    let filtered = steward
        .summary(
            &ctx(),
            &SummaryFilter {
                min_score: Some(0.9),
                ..SummaryFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(filtered.total, 1);

    let events = steward.audit().query_by_actor("maria", Some(1)).await.unwrap();
    assert_eq!(events[0].action, AuditAction::Export);
    assert_eq!(events[0].details["format"], "summary");

    let viewer = RequestContext::local(Actor::new("joao", Role::Viewer));
    let err = steward.summary(&viewer, &SummaryFilter::default()).await.unwrap_err();
    assert!(matches!(err, StewardError::Forbidden(_)));
}
