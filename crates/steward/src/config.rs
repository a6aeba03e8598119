//! Library configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::access::{PermissionMap, default_permissions};
use crate::audit::AuditConfig;
use crate::decision::DecisionPolicy;
use crate::error::{Result, StewardError};
use crate::validation::RuleConfig;

/// Configuration for a [`crate::Steward`] instance.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StewardConfig {
    /// Parameters of the standard rule catalog.
    pub rules: RuleConfig,
    /// Which decisions are accepted.
    pub decisions: DecisionPolicy,
    /// Audit query limits.
    pub audit: AuditConfig,
    /// Permissions granted to each role.
    pub permissions: PermissionMap,
}

impl Default for StewardConfig {
    fn default() -> Self {
        Self {
            rules: RuleConfig::default(),
            decisions: DecisionPolicy::default(),
            audit: AuditConfig::default(),
            permissions: default_permissions(),
        }
    }
}

impl StewardConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| StewardError::Config(format!("invalid configuration: {}", e)))?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| StewardError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&json)
    }

    fn check(&self) -> Result<()> {
        if self.rules.phone_min_digits > self.rules.phone_max_digits {
            return Err(StewardError::Config(format!(
                "phone_min_digits ({}) exceeds phone_max_digits ({})",
                self.rules.phone_min_digits, self.rules.phone_max_digits
            )));
        }
        if self.audit.max_limit == 0 {
            return Err(StewardError::Config("audit.max_limit must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Permission, Role};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = StewardConfig::from_json(
            r#"{"decisions": {"require_link_for_duplicate": false}, "audit": {"default_limit": 20}}"#,
        )
        .unwrap();

        assert!(!config.decisions.require_link_for_duplicate);
        assert_eq!(config.audit.default_limit, 20);
        assert_eq!(config.audit.max_limit, 500);
        assert_eq!(config.rules.phone_min_digits, 10);
        assert!(config.permissions.contains_key(&Role::Viewer));
    }

    #[test]
    fn test_permissions_override() {
        let config = StewardConfig::from_json(
            r#"{"permissions": {"viewer": ["view-entity", "compare-entities"]}}"#,
        )
        .unwrap();

        assert_eq!(
            config.permissions[&Role::Viewer],
            vec![Permission::ViewEntity, Permission::CompareEntities]
        );
        assert!(!config.permissions.contains_key(&Role::Admin));
    }

    #[test]
    fn test_inconsistent_bounds_rejected() {
        let err = StewardConfig::from_json(
            r#"{"rules": {"phone_min_digits": 14, "phone_max_digits": 10}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, StewardError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"audit": {{"max_limit": 100}}}}"#).unwrap();

        let config = StewardConfig::load(file.path()).unwrap();
        assert_eq!(config.audit.max_limit, 100);

        let err = StewardConfig::load("/nonexistent/steward.json").unwrap_err();
        assert!(matches!(err, StewardError::Io { .. }));
    }
}
