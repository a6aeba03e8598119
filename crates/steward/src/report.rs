//! Population-level summaries: entity counts by status and by score band.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityStatus};
use crate::error::{Result, StewardError};

/// Score band boundaries. Each band is `[lower, upper)`; the last upper bound
/// sits above 1 so a perfect score lands in the top band.
pub const SCORE_BOUNDARIES: [f64; 5] = [0.0, 0.5, 0.7, 0.85, 1.01];

/// Which entities a summary covers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryFilter {
    #[serde(default)]
    pub status: Option<EntityStatus>,
    /// Inclusive lower bound on the quality score.
    #[serde(default)]
    pub min_score: Option<f64>,
    /// Inclusive upper bound on the quality score.
    #[serde(default)]
    pub max_score: Option<f64>,
}

impl SummaryFilter {
    /// Reject bounds that are not finite numbers.
    pub fn check(&self) -> Result<()> {
        for (name, bound) in [("min_score", self.min_score), ("max_score", self.max_score)] {
            if bound.is_some_and(|b| !b.is_finite()) {
                return Err(StewardError::InvalidInput(format!(
                    "{} must be a finite number",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        self.status.is_none_or(|s| entity.status == s)
            && self.min_score.is_none_or(|min| entity.quality_score >= min)
            && self.max_score.is_none_or(|max| entity.quality_score <= max)
    }
}

/// Count and mean score for one status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    pub status: EntityStatus,
    pub count: usize,
    pub average_score: f64,
}

/// Entities whose score falls in `[lower, upper)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBand {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub entity_ids: Vec<String>,
}

/// Summary of every entity matching a filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub total: usize,
    /// Only statuses with at least one entity, in lifecycle order.
    pub by_status: Vec<StatusSummary>,
    /// Only non-empty bands, lowest first.
    pub by_score_range: Vec<ScoreBand>,
    pub generated_at: DateTime<Utc>,
}

/// Group already-filtered entities by status and by score band.
pub fn summarize<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> SummaryReport {
    let entities: Vec<&Entity> = entities.into_iter().collect();

    let by_status = EntityStatus::ALL
        .into_iter()
        .filter_map(|status| {
            let scores: Vec<f64> = entities
                .iter()
                .filter(|e| e.status == status)
                .map(|e| e.quality_score)
                .collect();
            if scores.is_empty() {
                return None;
            }
            Some(StatusSummary {
                status,
                count: scores.len(),
                average_score: scores.iter().sum::<f64>() / scores.len() as f64,
            })
        })
        .collect();

    let by_score_range = SCORE_BOUNDARIES
        .windows(2)
        .filter_map(|bounds| {
            let (lower, upper) = (bounds[0], bounds[1]);
            let entity_ids: Vec<String> = entities
                .iter()
                .filter(|e| e.quality_score >= lower && e.quality_score < upper)
                .map(|e| e.id.clone())
                .collect();
            (!entity_ids.is_empty()).then(|| ScoreBand {
                lower,
                upper,
                count: entity_ids.len(),
                entity_ids,
            })
        })
        .collect();

    SummaryReport {
        total: entities.len(),
        by_status,
        by_score_range,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: &str, status: EntityStatus, score: f64) -> Entity {
        let mut entity = Entity::new(id, id);
        entity.status = status;
        entity.quality_score = score;
        entity
    }

    fn population() -> Vec<Entity> {
        vec![
            scored("A", EntityStatus::ToReview, 0.2),
            scored("B", EntityStatus::ToReview, 0.6),
            scored("C", EntityStatus::Validated, 1.0),
            scored("D", EntityStatus::Validated, 0.9),
            scored("E", EntityStatus::Duplicate, 0.85),
        ]
    }

    #[test]
    fn test_groups_by_status_in_lifecycle_order() {
        let report = summarize(&population());

        assert_eq!(report.total, 5);
        let statuses: Vec<_> = report.by_status.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![EntityStatus::ToReview, EntityStatus::Validated, EntityStatus::Duplicate]
        );
        assert_eq!(report.by_status[0].count, 2);
        assert!((report.by_status[0].average_score - 0.4).abs() < 1e-9);
        assert!((report.by_status[1].average_score - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_score_bands_skip_empty_and_include_perfect() {
        let report = summarize(&population());

        let bands: Vec<_> = report
            .by_score_range
            .iter()
            .map(|b| (b.lower, b.count))
            .collect();
        assert_eq!(bands, vec![(0.0, 1), (0.5, 1), (0.85, 3)]);
        assert_eq!(report.by_score_range[2].entity_ids, vec!["C", "D", "E"]);
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let filter = SummaryFilter {
            status: None,
            min_score: Some(0.6),
            max_score: Some(0.9),
        };
        let ids: Vec<_> = population()
            .into_iter()
            .filter(|e| filter.matches(e))
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["B", "D", "E"]);
    }

    #[test]
    fn test_non_finite_bound_rejected() {
        let filter = SummaryFilter {
            min_score: Some(f64::NAN),
            ..SummaryFilter::default()
        };
        assert!(matches!(filter.check(), Err(StewardError::InvalidInput(_))));
        assert!(SummaryFilter::default().check().is_ok());
    }

    #[test]
    fn test_empty_population() {
        let report = summarize(&Vec::new());
        assert_eq!(report.total, 0);
        assert!(report.by_status.is_empty());
        assert!(report.by_score_range.is_empty());
    }
}
