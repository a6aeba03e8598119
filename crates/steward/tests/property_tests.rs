//! Property-based tests for scoring and name normalization.
//!
//! ```bash
//! PROPTEST_CASES=10000 cargo test -p steward --test property_tests
//! ```

use proptest::prelude::*;

use steward::entity::normalize_name;
use steward::validation::{RuleResult, RuleStatus, Severity, ValidationSummary};

// =============================================================================
// Test Strategies
// =============================================================================

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Info),
        Just(Severity::Warning),
        Just(Severity::Error),
    ]
}

fn rule_result() -> impl Strategy<Value = RuleResult> {
    (severity(), any::<bool>()).prop_map(|(severity, passed)| RuleResult {
        rule_id: "generated".into(),
        rule_name: "Generated".into(),
        severity,
        status: if passed { RuleStatus::Pass } else { RuleStatus::Fail },
        detail: String::new(),
    })
}

// =============================================================================
// Score Properties
// =============================================================================

proptest! {
    #[test]
    fn score_within_bounds(results in prop::collection::vec(rule_result(), 0..40)) {
        let score = ValidationSummary::from_results(&results).score();
        prop_assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn score_is_deterministic(results in prop::collection::vec(rule_result(), 0..40)) {
        let a = ValidationSummary::from_results(&results).score();
        let b = ValidationSummary::from_results(&results).score();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn all_passing_scores_one(n in 1usize..40) {
        let summary = ValidationSummary { total: n, passed: n, errors: 0, warnings: 0 };
        prop_assert_eq!(summary.score(), 1.0);
    }

    #[test]
    fn tally_accounts_for_every_pass_and_penalized_failure(
        results in prop::collection::vec(rule_result(), 0..40)
    ) {
        let summary = ValidationSummary::from_results(&results);
        let info_failures = results
            .iter()
            .filter(|r| !r.passed() && r.severity == Severity::Info)
            .count();
        prop_assert_eq!(
            summary.passed + summary.errors + summary.warnings + info_failures,
            summary.total
        );
    }

    #[test]
    fn score_has_two_decimals(results in prop::collection::vec(rule_result(), 1..40)) {
        let score = ValidationSummary::from_results(&results).score();
        let scaled = score * 100.0;
        prop_assert!((scaled - scaled.round()).abs() < 1e-9);
    }
}

// =============================================================================
// Normalization Properties
// =============================================================================

proptest! {
    #[test]
    fn normalized_name_is_uppercase_letters_and_single_spaces(name in "\\PC{0,60}") {
        let normalized = normalize_name(&name);
        prop_assert!(normalized.chars().all(|c| c.is_ascii_uppercase() || c == ' '));
        prop_assert!(!normalized.contains("  "));
        prop_assert_eq!(normalized.trim(), normalized.as_str());
    }

    #[test]
    fn normalization_is_idempotent(name in "\\PC{0,60}") {
        let once = normalize_name(&name);
        prop_assert_eq!(normalize_name(&once), once);
    }
}
