//! HCP entity documents and their sub-element collections.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StewardError;

use super::normalize::normalize_name;

/// Stewardship status of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityStatus {
    /// Not yet adjudicated, or sent back for review.
    #[default]
    ToReview,
    /// Confirmed as correct.
    Validated,
    /// Confirmed as wrong or unusable.
    Rejected,
    /// Needs upstream correction.
    NeedsCorrection,
    /// Duplicate of another entity.
    Duplicate,
}

impl EntityStatus {
    /// All statuses in display order.
    pub const ALL: [EntityStatus; 5] = [
        EntityStatus::ToReview,
        EntityStatus::Validated,
        EntityStatus::Rejected,
        EntityStatus::NeedsCorrection,
        EntityStatus::Duplicate,
    ];

    /// Wire tag, as used in JSON and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::ToReview => "to-review",
            EntityStatus::Validated => "validated",
            EntityStatus::Rejected => "rejected",
            EntityStatus::NeedsCorrection => "needs-correction",
            EntityStatus::Duplicate => "duplicate",
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            EntityStatus::ToReview => "To Review",
            EntityStatus::Validated => "Validated",
            EntityStatus::Rejected => "Rejected",
            EntityStatus::NeedsCorrection => "Needs Correction",
            EntityStatus::Duplicate => "Duplicate",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityStatus {
    type Err = StewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StewardError::InvalidInput(format!("unknown status '{}'", s)))
    }
}

/// One prior-value/new-value entry in an audit trail carried on a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailEntry {
    pub at: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<Value>,
}

/// A specialty attached to a credential.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    /// Specialty registry number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A registration credential (license number within a jurisdiction).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Registration status as reported by the issuing body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specialties: Vec<Specialty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_trail: Vec<TrailEntry>,
}

impl Credential {
    /// Create a credential from jurisdiction and number.
    pub fn new(jurisdiction: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            jurisdiction: Some(jurisdiction.into()),
            number: Some(number.into()),
            ..Self::default()
        }
    }

    /// Set the registration status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// `number/jurisdiction`, with `?` for missing parts.
    pub fn display_key(&self) -> String {
        format!(
            "{}/{}",
            self.number.as_deref().unwrap_or("?"),
            self.jurisdiction.as_deref().unwrap_or("?")
        )
    }
}

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Address type (office, home, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Pre-formatted single-line form, when the source supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_trail: Vec<TrailEntry>,
}

impl Address {
    /// Single-line rendering: the formatted form if present, else assembled.
    pub fn one_line(&self) -> String {
        if let Some(formatted) = self.formatted.as_deref().filter(|f| !f.trim().is_empty()) {
            return formatted.to_string();
        }
        format!(
            "{}, {} - {}/{}",
            self.street.as_deref().unwrap_or(""),
            self.number.as_deref().unwrap_or(""),
            self.municipality.as_deref().unwrap_or(""),
            self.region.as_deref().unwrap_or("")
        )
    }
}

/// A phone number as received from the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Phone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_trail: Vec<TrailEntry>,
}

impl Phone {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: Some(number.into()),
            ..Self::default()
        }
    }
}

/// An email address as received from the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Email {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_trail: Vec<TrailEntry>,
}

impl Email {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }
}

/// An organizational affiliation (facility, practice, hospital).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Affiliation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// National facility registry code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_code: Option<String>,
    /// Reference period of the source extract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bond: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_trail: Vec<TrailEntry>,
}

impl Affiliation {
    /// Trade name, falling back to legal name.
    pub fn display_name(&self) -> Option<&str> {
        self.trade_name.as_deref().or(self.legal_name.as_deref())
    }
}

/// Supplementary attribution of the record to an upstream source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceAttribution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laboratory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// One healthcare-provider master record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable external identifier. Unique and immutable once assigned.
    pub id: String,
    /// Display name as received from the source.
    pub name: String,
    /// Derived from `name`; see [`normalize_name`].
    #[serde(default)]
    pub normalized_name: String,
    /// Rule-based quality score in [0, 1].
    #[serde(default)]
    pub quality_score: f64,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default)]
    pub credentials: Vec<Credential>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub phones: Vec<Phone>,
    #[serde(default)]
    pub emails: Vec<Email>,
    #[serde(default)]
    pub affiliations: Vec<Affiliation>,
    #[serde(default)]
    pub sources: Vec<SourceAttribution>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_trail: Vec<TrailEntry>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// Create an empty entity with a derived normalized name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: id.into(),
            normalized_name: normalize_name(&name),
            name,
            quality_score: 0.0,
            status: EntityStatus::ToReview,
            credentials: Vec::new(),
            addresses: Vec::new(),
            phones: Vec::new(),
            emails: Vec::new(),
            affiliations: Vec::new(),
            sources: Vec::new(),
            audit_trail: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a credential.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credentials.push(credential);
        self
    }

    /// Add an address.
    pub fn with_address(mut self, address: Address) -> Self {
        self.addresses.push(address);
        self
    }

    /// Add a phone number.
    pub fn with_phone(mut self, number: impl Into<String>) -> Self {
        self.phones.push(Phone::new(number));
        self
    }

    /// Add an email address.
    pub fn with_email(mut self, address: impl Into<String>) -> Self {
        self.emails.push(Email::new(address));
        self
    }

    /// Add an affiliation.
    pub fn with_affiliation(mut self, affiliation: Affiliation) -> Self {
        self.affiliations.push(affiliation);
        self
    }

    /// Add a source attribution.
    pub fn with_source(mut self, source: SourceAttribution) -> Self {
        self.sources.push(source);
        self
    }

    /// Recompute the normalized name from the display name.
    pub fn refresh_normalized_name(&mut self) {
        self.normalized_name = normalize_name(&self.name);
    }

    /// `number/jurisdiction` of the first credential, or `-`.
    pub fn primary_credential(&self) -> String {
        self.credentials
            .first()
            .map(Credential::display_key)
            .unwrap_or_else(|| "-".to_string())
    }
}
