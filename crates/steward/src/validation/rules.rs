//! The standard rule catalog for HCP entities.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entity::{Address, Entity, normalize_name};
use crate::error::Result;
use crate::store::RecordStore;

use super::rule::{Rule, RuleInfo, RuleOutcome, Severity};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

/// Tunables for the standard rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Credential statuses that do not raise a flag. Compared case-insensitively.
    pub acceptable_credential_statuses: Vec<String>,
    /// Fewest digits a phone number may have.
    pub phone_min_digits: usize,
    /// Most digits a phone number may have.
    pub phone_max_digits: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            acceptable_credential_statuses: ["ACTIVE", "REGULAR", "REGISTERED", "ATIVO", "INSCRITO"]
                .into_iter()
                .map(String::from)
                .collect(),
            phone_min_digits: 10,
            phone_max_digits: 13,
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// A credential (jurisdiction + number) must not appear on any other entity.
pub struct UniqueCredentialRule;

#[async_trait]
impl Rule for UniqueCredentialRule {
    fn id(&self) -> &'static str {
        "unique-credential-per-entity"
    }

    fn name(&self) -> &'static str {
        "Unique Credential per Entity"
    }

    fn description(&self) -> &'static str {
        "Checks that each registration credential belongs to a single entity."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    async fn evaluate(&self, entity: &Entity, store: &dyn RecordStore) -> Result<RuleOutcome> {
        let mut violations = Vec::new();

        for credential in &entity.credentials {
            let (Some(jurisdiction), Some(number)) = (
                credential.jurisdiction.as_deref().filter(|j| !j.trim().is_empty()),
                credential.number.as_deref().filter(|n| !n.trim().is_empty()),
            ) else {
                continue;
            };

            let holders = store
                .count_credential_holders(jurisdiction, number, &entity.id)
                .await?;
            if holders > 0 {
                violations.push(format!(
                    "Credential {}/{} found on {} other entity(ies).",
                    number, jurisdiction, holders
                ));
            }
        }

        Ok(RuleOutcome::from_violations(
            violations,
            "; ",
            "All credentials are unique.",
        ))
    }
}

/// Each phone number's digits must fall within the configured length bounds.
pub struct PhoneFormatRule {
    min_digits: usize,
    max_digits: usize,
}

impl PhoneFormatRule {
    pub fn new(min_digits: usize, max_digits: usize) -> Self {
        Self {
            min_digits,
            max_digits,
        }
    }
}

impl Default for PhoneFormatRule {
    fn default() -> Self {
        let config = RuleConfig::default();
        Self::new(config.phone_min_digits, config.phone_max_digits)
    }
}

#[async_trait]
impl Rule for PhoneFormatRule {
    fn id(&self) -> &'static str {
        "phone-format"
    }

    fn name(&self) -> &'static str {
        "Phone Format"
    }

    fn description(&self) -> &'static str {
        "Checks that every phone number has a plausible digit count."
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn info(&self) -> RuleInfo {
        RuleInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: format!(
                "Checks that every phone number has between {} and {} digits.",
                self.min_digits, self.max_digits
            ),
            severity: self.severity(),
        }
    }

    async fn evaluate(&self, entity: &Entity, _store: &dyn RecordStore) -> Result<RuleOutcome> {
        let invalid: Vec<&str> = entity
            .phones
            .iter()
            .filter_map(|p| p.number.as_deref())
            .filter(|n| !n.is_empty())
            .filter(|n| {
                let digits = n.chars().filter(char::is_ascii_digit).count();
                digits < self.min_digits || digits > self.max_digits
            })
            .collect();

        if invalid.is_empty() {
            Ok(RuleOutcome::pass("All phone numbers have a valid format."))
        } else {
            Ok(RuleOutcome::fail(format!(
                "Phone numbers with invalid format: {}",
                invalid.join(", ")
            )))
        }
    }
}

/// Each email must have a `local@domain.tld` shape.
pub struct EmailFormatRule;

#[async_trait]
impl Rule for EmailFormatRule {
    fn id(&self) -> &'static str {
        "email-format"
    }

    fn name(&self) -> &'static str {
        "Email Format"
    }

    fn description(&self) -> &'static str {
        "Checks that every email address is well formed."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    async fn evaluate(&self, entity: &Entity, _store: &dyn RecordStore) -> Result<RuleOutcome> {
        let invalid: Vec<&str> = entity
            .emails
            .iter()
            .filter_map(|e| e.address.as_deref())
            .filter(|a| !a.is_empty() && !EMAIL_PATTERN.is_match(a))
            .collect();

        if invalid.is_empty() {
            Ok(RuleOutcome::pass("All email addresses have a valid format."))
        } else {
            Ok(RuleOutcome::fail(format!(
                "Invalid email addresses: {}",
                invalid.join(", ")
            )))
        }
    }
}

/// Each address must carry every required field.
pub struct AddressCompletenessRule;

impl AddressCompletenessRule {
    fn missing_fields(address: &Address) -> Vec<&'static str> {
        [
            ("type", address.kind.as_deref()),
            ("street", address.street.as_deref()),
            ("number", address.number.as_deref()),
            ("municipality", address.municipality.as_deref()),
            ("region", address.region.as_deref()),
            ("postal_code", address.postal_code.as_deref()),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(*value))
        .map(|(field, _)| field)
        .collect()
    }
}

#[async_trait]
impl Rule for AddressCompletenessRule {
    fn id(&self) -> &'static str {
        "address-completeness"
    }

    fn name(&self) -> &'static str {
        "Address Completeness"
    }

    fn description(&self) -> &'static str {
        "Checks that each address has type, street, number, municipality, region and postal code."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    async fn evaluate(&self, entity: &Entity, _store: &dyn RecordStore) -> Result<RuleOutcome> {
        let violations: Vec<String> = entity
            .addresses
            .iter()
            .enumerate()
            .filter_map(|(idx, address)| {
                let missing = Self::missing_fields(address);
                (!missing.is_empty())
                    .then(|| format!("Address {}: missing {}", idx + 1, missing.join(", ")))
            })
            .collect();

        Ok(RuleOutcome::from_violations(
            violations,
            "; ",
            "All addresses are complete.",
        ))
    }
}

/// The normalized name must not be shared with another entity.
pub struct DuplicateNameRule;

#[async_trait]
impl Rule for DuplicateNameRule {
    fn id(&self) -> &'static str {
        "duplicate-normalized-name"
    }

    fn name(&self) -> &'static str {
        "Duplicate Name"
    }

    fn description(&self) -> &'static str {
        "Checks whether the normalized name appears on more than one entity."
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    async fn evaluate(&self, entity: &Entity, store: &dyn RecordStore) -> Result<RuleOutcome> {
        let normalized = if entity.normalized_name.is_empty() {
            normalize_name(&entity.name)
        } else {
            entity.normalized_name.clone()
        };

        if normalized.is_empty() {
            return Ok(RuleOutcome::pass("No normalized name to compare."));
        }

        let count = store.count_normalized_name(&normalized, &entity.id).await?;
        if count > 0 {
            Ok(RuleOutcome::fail(format!(
                "Name \"{}\" found on {} other entity(ies).",
                normalized, count
            )))
        } else {
            Ok(RuleOutcome::pass("Name is unique."))
        }
    }
}

/// Every credential's status must be in the acceptable allow-list.
pub struct CredentialStatusRule {
    acceptable: Vec<String>,
}

impl CredentialStatusRule {
    pub fn new(acceptable: &[String]) -> Self {
        Self {
            acceptable: acceptable.iter().map(|s| s.trim().to_uppercase()).collect(),
        }
    }
}

impl Default for CredentialStatusRule {
    fn default() -> Self {
        Self::new(&RuleConfig::default().acceptable_credential_statuses)
    }
}

#[async_trait]
impl Rule for CredentialStatusRule {
    fn id(&self) -> &'static str {
        "credential-status"
    }

    fn name(&self) -> &'static str {
        "Credential Status"
    }

    fn description(&self) -> &'static str {
        "Checks for credentials whose registration status is not in good standing."
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    async fn evaluate(&self, entity: &Entity, _store: &dyn RecordStore) -> Result<RuleOutcome> {
        let irregular: Vec<String> = entity
            .credentials
            .iter()
            .filter_map(|c| {
                let status = c.status.as_deref().filter(|s| !s.trim().is_empty())?;
                let known = self.acceptable.contains(&status.trim().to_uppercase());
                (!known).then(|| format!("{} ({})", c.display_key(), status))
            })
            .collect();

        if irregular.is_empty() {
            Ok(RuleOutcome::pass("All credentials are in good standing."))
        } else {
            Ok(RuleOutcome::fail(format!(
                "Credentials with irregular status: {}",
                irregular.join(", ")
            )))
        }
    }
}

/// Display name and at least one credential must be present.
pub struct RequiredFieldsRule;

#[async_trait]
impl Rule for RequiredFieldsRule {
    fn id(&self) -> &'static str {
        "required-fields"
    }

    fn name(&self) -> &'static str {
        "Required Fields"
    }

    fn description(&self) -> &'static str {
        "Checks that the essential fields are present."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    async fn evaluate(&self, entity: &Entity, _store: &dyn RecordStore) -> Result<RuleOutcome> {
        let mut missing = Vec::new();
        if entity.name.trim().is_empty() {
            missing.push("name");
        }
        if entity.credentials.is_empty() {
            missing.push("credentials");
        }

        if missing.is_empty() {
            Ok(RuleOutcome::pass("All required fields are present."))
        } else {
            Ok(RuleOutcome::fail(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}
