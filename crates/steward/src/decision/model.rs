//! Decision records and item selections.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::entity::EntityStatus;
use crate::error::StewardError;

/// Kind of human adjudication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionType {
    Validate,
    Reject,
    Correct,
    Duplicate,
    Unrelated,
}

impl DecisionType {
    pub const ALL: [DecisionType; 5] = [
        DecisionType::Validate,
        DecisionType::Reject,
        DecisionType::Correct,
        DecisionType::Duplicate,
        DecisionType::Unrelated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::Validate => "validate",
            DecisionType::Reject => "reject",
            DecisionType::Correct => "correct",
            DecisionType::Duplicate => "duplicate",
            DecisionType::Unrelated => "unrelated",
        }
    }

    /// Status the entity moves to when this decision is applied.
    pub fn target_status(&self) -> EntityStatus {
        match self {
            DecisionType::Validate => EntityStatus::Validated,
            DecisionType::Reject => EntityStatus::Rejected,
            DecisionType::Correct => EntityStatus::NeedsCorrection,
            DecisionType::Duplicate => EntityStatus::Duplicate,
            DecisionType::Unrelated => EntityStatus::ToReview,
        }
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionType {
    type Err = StewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DecisionType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                StewardError::InvalidInput(format!(
                    "decision_type must be one of validate, reject, correct, duplicate, unrelated; got '{}'",
                    s
                ))
            })
    }
}

/// One of the six sub-element collections of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Credentials,
    Addresses,
    Phones,
    Emails,
    Affiliations,
    Sources,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Credentials,
        Section::Addresses,
        Section::Phones,
        Section::Emails,
        Section::Affiliations,
        Section::Sources,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Section::Credentials => "Credential",
            Section::Addresses => "Address",
            Section::Phones => "Phone",
            Section::Emails => "Email",
            Section::Affiliations => "Affiliation",
            Section::Sources => "Source",
        }
    }
}

/// A selected sub-element as it looked when the decision was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetail {
    /// 1-based position in the section at decision time.
    pub index: usize,
    pub value: String,
    pub label: String,
}

/// Raw positions per section.
pub type SectionIndices = IndexMap<Section, Vec<usize>>;

/// Resolved details per section.
pub type SectionDetails = IndexMap<Section, Vec<ItemDetail>>;

/// Sub-elements an actor had selected when deciding.
///
/// Older records only kept raw positions, which lose their meaning once the
/// entity's lists are reordered. New records are always resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", content = "sections", rename_all = "snake_case")]
pub enum ItemSelection {
    /// Raw positions only.
    Indices(SectionIndices),
    /// Positions with the value and label they had at decision time.
    Resolved(SectionDetails),
}

impl ItemSelection {
    /// Read the two independent fields older records carried.
    ///
    /// Resolved details win when present; raw positions are the fallback.
    /// Empty maps count as absent.
    pub fn from_legacy(
        selected_items: Option<SectionIndices>,
        item_details: Option<SectionDetails>,
    ) -> Option<Self> {
        let details = item_details.filter(has_items);
        let indices = selected_items.filter(has_items);

        match (details, indices) {
            (Some(details), _) => Some(ItemSelection::Resolved(details)),
            (None, Some(indices)) => Some(ItemSelection::Indices(indices)),
            (None, None) => None,
        }
    }

    /// Positions per section, whichever form this is.
    pub fn indices(&self) -> SectionIndices {
        match self {
            ItemSelection::Indices(indices) => indices.clone(),
            ItemSelection::Resolved(details) => details
                .iter()
                .map(|(section, items)| (*section, items.iter().map(|d| d.index).collect()))
                .collect(),
        }
    }

    /// Resolved details, if this record has them.
    pub fn details(&self) -> Option<&SectionDetails> {
        match self {
            ItemSelection::Resolved(details) => Some(details),
            ItemSelection::Indices(_) => None,
        }
    }

    /// Total selected items.
    pub fn len(&self) -> usize {
        match self {
            ItemSelection::Indices(indices) => indices.values().map(Vec::len).sum(),
            ItemSelection::Resolved(details) => details.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn has_items<T>(sections: &IndexMap<Section, Vec<T>>) -> bool {
    sections.values().any(|items| !items.is_empty())
}

/// One immutable human adjudication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredDecision")]
pub struct Decision {
    pub id: String,
    pub entity_id: String,
    pub actor: String,
    pub role: Role,
    pub decided_at: DateTime<Utc>,
    pub decision_type: DecisionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_entity_id: Option<String>,
    pub comments: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<ItemSelection>,
}

impl Decision {
    /// Status this decision applied to its entity.
    pub fn applied_status(&self) -> EntityStatus {
        self.decision_type.target_status()
    }
}

/// On-disk decision shape, accepting both current and older layouts.
#[derive(Deserialize)]
struct StoredDecision {
    id: String,
    entity_id: String,
    actor: String,
    role: Role,
    decided_at: DateTime<Utc>,
    decision_type: DecisionType,
    #[serde(default)]
    linked_entity_id: Option<String>,
    #[serde(default)]
    comments: String,
    #[serde(default)]
    selection: Option<ItemSelection>,
    #[serde(default)]
    selected_items: Option<SectionIndices>,
    #[serde(default)]
    item_details: Option<SectionDetails>,
}

impl From<StoredDecision> for Decision {
    fn from(stored: StoredDecision) -> Self {
        let selection = stored
            .selection
            .or_else(|| ItemSelection::from_legacy(stored.selected_items, stored.item_details));

        Decision {
            id: stored.id,
            entity_id: stored.entity_id,
            actor: stored.actor,
            role: stored.role,
            decided_at: stored.decided_at,
            decision_type: stored.decision_type,
            linked_entity_id: stored.linked_entity_id,
            comments: stored.comments,
            selection,
        }
    }
}
