//! Rule trait and rule result types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::Result;
use crate::store::RecordStore;

/// Severity level of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only, does not affect the score when failing.
    Info,
    /// Potential issue that should be reviewed.
    Warning,
    /// Definite structural or business issue.
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// Pass/fail outcome of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Pass,
    Fail,
}

/// What a rule reports back: one aggregated outcome and its detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub status: RuleStatus,
    pub detail: String,
}

impl RuleOutcome {
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            status: RuleStatus::Pass,
            detail: detail.into(),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            status: RuleStatus::Fail,
            detail: detail.into(),
        }
    }

    /// Fail with all violations joined, or pass with `ok` when there are none.
    pub fn from_violations(violations: Vec<String>, separator: &str, ok: &str) -> Self {
        if violations.is_empty() {
            Self::pass(ok)
        } else {
            Self::fail(violations.join(separator))
        }
    }
}

/// The recorded result of one rule within a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub status: RuleStatus,
    pub detail: String,
}

impl RuleResult {
    pub fn passed(&self) -> bool {
        self.status == RuleStatus::Pass
    }
}

/// Catalog listing entry for a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
}

/// One independent validation predicate.
///
/// A rule inspects one entity and, for cross-entity checks, queries the
/// store. It reports a single outcome summarising every violation it found.
/// Returning `Err` marks the rule as faulted; the engine turns that into a
/// failing error-severity result and keeps going.
#[async_trait]
pub trait Rule: Send + Sync {
    /// Stable identifier, e.g. `phone-format`.
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn severity(&self) -> Severity;

    async fn evaluate(&self, entity: &Entity, store: &dyn RecordStore) -> Result<RuleOutcome>;

    fn info(&self) -> RuleInfo {
        RuleInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            severity: self.severity(),
        }
    }
}
