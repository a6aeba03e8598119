use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::Role;

/// Kind of action an audit event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditAction {
    Login,
    Logout,
    ViewEntity,
    UpdateEntity,
    Decision,
    UploadData,
    Export,
    Search,
    Compare,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::ViewEntity => "view-entity",
            AuditAction::UpdateEntity => "update-entity",
            AuditAction::Decision => "decision",
            AuditAction::UploadData => "upload-data",
            AuditAction::Export => "export",
            AuditAction::Search => "search",
            AuditAction::Compare => "compare",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a request came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub caller_address: String,
    pub client: String,
}

impl RequestMetadata {
    pub fn new(caller_address: impl Into<String>, client: impl Into<String>) -> Self {
        Self {
            caller_address: caller_address.into(),
            client: client.into(),
        }
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new("unknown", "unknown")
    }
}

/// One append-only audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub actor: String,
    pub role: Role,
    pub action: AuditAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub metadata: RequestMetadata,
    #[serde(default)]
    pub details: Value,
    pub at: DateTime<Utc>,
}
