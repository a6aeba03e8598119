//! Rule catalog and the scoring engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::Entity;
use crate::error::{Result, StewardError};
use crate::store::RecordStore;

use super::rule::{Rule, RuleInfo, RuleResult, RuleStatus, Severity};
use super::rules::{
    AddressCompletenessRule, CredentialStatusRule, DuplicateNameRule, EmailFormatRule,
    PhoneFormatRule, RequiredFieldsRule, RuleConfig, UniqueCredentialRule,
};

/// Penalty per failing error-severity rule.
pub const ERROR_PENALTY: f64 = 0.3;
/// Penalty per failing warning-severity rule.
pub const WARNING_PENALTY: f64 = 0.1;

/// Ordered registry of rules. Evaluation order is declaration order.
pub struct RuleCatalog {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleCatalog {
    /// An empty catalog.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The standard HCP catalog.
    pub fn standard(config: &RuleConfig) -> Self {
        Self::empty()
            .with_rule(UniqueCredentialRule)
            .with_rule(PhoneFormatRule::new(
                config.phone_min_digits,
                config.phone_max_digits,
            ))
            .with_rule(EmailFormatRule)
            .with_rule(AddressCompletenessRule)
            .with_rule(DuplicateNameRule)
            .with_rule(CredentialStatusRule::new(
                &config.acceptable_credential_statuses,
            ))
            .with_rule(RequiredFieldsRule)
    }

    /// Append a rule at the end of the evaluation order.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Listing of every rule, in evaluation order.
    pub fn describe(&self) -> Vec<RuleInfo> {
        self.rules.iter().map(|r| r.info()).collect()
    }

    /// Run every rule against one entity. A faulted rule becomes a failing
    /// error-severity result; the remaining rules still run.
    pub async fn evaluate(&self, entity: &Entity, store: &dyn RecordStore) -> Vec<RuleResult> {
        let mut results = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let result = match rule.evaluate(entity, store).await {
                Ok(outcome) => RuleResult {
                    rule_id: rule.id().to_string(),
                    rule_name: rule.name().to_string(),
                    severity: rule.severity(),
                    status: outcome.status,
                    detail: outcome.detail,
                },
                Err(e) => {
                    tracing::warn!(
                        rule = rule.id(),
                        entity_id = %entity.id,
                        error = %e,
                        "Rule evaluation failed"
                    );
                    RuleResult {
                        rule_id: rule.id().to_string(),
                        rule_name: rule.name().to_string(),
                        severity: Severity::Error,
                        status: RuleStatus::Fail,
                        detail: format!("Rule evaluation failed: {}", e),
                    }
                }
            };
            results.push(result);
        }

        results
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::standard(&RuleConfig::default())
    }
}

/// Pass/error/warning tally for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub passed: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl ValidationSummary {
    /// Tally rule results.
    pub fn from_results(results: &[RuleResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match (result.status, result.severity) {
                (RuleStatus::Pass, _) => summary.passed += 1,
                (RuleStatus::Fail, Severity::Error) => summary.errors += 1,
                (RuleStatus::Fail, Severity::Warning) => summary.warnings += 1,
                (RuleStatus::Fail, Severity::Info) => {}
            }
        }
        summary
    }

    /// `max(0, (P - 0.3E - 0.1W) / T)` rounded to two decimals.
    ///
    /// An empty catalog has nothing to fail and scores 1.0.
    pub fn score(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        let raw = (self.passed as f64
            - ERROR_PENALTY * self.errors as f64
            - WARNING_PENALTY * self.warnings as f64)
            / self.total as f64;
        round_score(raw.max(0.0))
    }
}

fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// One immutable execution of the catalog against one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRun {
    pub id: String,
    pub entity_id: String,
    pub created_at: DateTime<Utc>,
    pub rule_results: Vec<RuleResult>,
    pub score: f64,
}

/// What a validation returns to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Entity identifier.
    pub id: String,
    /// Identifier of the persisted run.
    pub run_id: String,
    pub score: f64,
    pub rule_results: Vec<RuleResult>,
    pub summary: ValidationSummary,
}

/// Evaluates the catalog, persists the run, and updates the entity score.
#[derive(Clone)]
pub struct ScoringEngine {
    catalog: Arc<RuleCatalog>,
    store: Arc<dyn RecordStore>,
}

impl ScoringEngine {
    pub fn new(catalog: RuleCatalog, store: Arc<dyn RecordStore>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            store,
        }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Validate one entity.
    ///
    /// Evaluation persists nothing, so dropping the future before it resolves
    /// leaves no trace. The commit (run insert, then score update) runs on its
    /// own task and completes even if the caller goes away mid-commit.
    pub async fn validate(&self, entity_id: &str) -> Result<ValidationResult> {
        let entity = self
            .store
            .get_entity(entity_id)
            .await?
            .ok_or_else(|| StewardError::entity_not_found(entity_id))?;

        let rule_results = self.catalog.evaluate(&entity, self.store.as_ref()).await;
        let summary = ValidationSummary::from_results(&rule_results);
        let score = summary.score();

        let run = ValidationRun {
            id: Uuid::new_v4().to_string(),
            entity_id: entity.id.clone(),
            created_at: Utc::now(),
            rule_results: rule_results.clone(),
            score,
        };
        let run_id = run.id.clone();

        let store = Arc::clone(&self.store);
        let commit = tokio::spawn(async move {
            let entity_id = run.entity_id.clone();
            store.insert_run(run).await?;
            store.set_quality_score(&entity_id, score).await
        });
        commit
            .await
            .map_err(|e| StewardError::StoreUnavailable(format!("validation commit aborted: {}", e)))??;

        tracing::info!(
            entity_id = %entity.id,
            run_id = %run_id,
            score,
            passed = summary.passed,
            errors = summary.errors,
            warnings = summary.warnings,
            "Validation run persisted"
        );

        Ok(ValidationResult {
            id: entity.id,
            run_id,
            score,
            rule_results,
            summary,
        })
    }

    /// The most recent persisted run for an entity.
    pub async fn last_run(&self, entity_id: &str) -> Result<Option<ValidationRun>> {
        self.store.latest_run(entity_id).await
    }
}
