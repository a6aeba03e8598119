//! Rule-based quality scoring.

mod engine;
mod rule;
mod rules;

pub use engine::{
    ERROR_PENALTY, RuleCatalog, ScoringEngine, ValidationResult, ValidationRun,
    ValidationSummary, WARNING_PENALTY,
};
pub use rule::{Rule, RuleInfo, RuleOutcome, RuleResult, RuleStatus, Severity};
pub use rules::{
    AddressCompletenessRule, CredentialStatusRule, DuplicateNameRule, EmailFormatRule,
    PhoneFormatRule, RequiredFieldsRule, RuleConfig, UniqueCredentialRule,
};
