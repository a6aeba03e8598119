//! Roles, permissions and the actor carried through every operation.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StewardError};

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Steward,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Steward, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Steward => "steward",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StewardError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| StewardError::InvalidInput(format!("unknown role '{}'", s)))
    }
}

/// A capability checked before an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    UploadData,
    ManageUsers,
    /// Grants every other permission.
    FullAccess,
    SearchEntities,
    ViewEntity,
    ValidateEntity,
    CompareEntities,
    ExportEntity,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::UploadData => "upload-data",
            Permission::ManageUsers => "manage-users",
            Permission::FullAccess => "full-access",
            Permission::SearchEntities => "search-entities",
            Permission::ViewEntity => "view-entity",
            Permission::ValidateEntity => "validate-entity",
            Permission::CompareEntities => "compare-entities",
            Permission::ExportEntity => "export-entity",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permissions granted to each role.
pub type PermissionMap = HashMap<Role, Vec<Permission>>;

/// The stock role grants.
pub fn default_permissions() -> PermissionMap {
    use Permission::*;

    let mut map = PermissionMap::new();
    map.insert(
        Role::Admin,
        vec![
            UploadData,
            ManageUsers,
            FullAccess,
            SearchEntities,
            ValidateEntity,
            CompareEntities,
            ExportEntity,
            ViewEntity,
        ],
    );
    map.insert(
        Role::Steward,
        vec![
            SearchEntities,
            ValidateEntity,
            CompareEntities,
            ExportEntity,
            ViewEntity,
        ],
    );
    map.insert(Role::Viewer, vec![SearchEntities, ViewEntity]);
    map
}

/// Role-based authorization.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    grants: PermissionMap,
}

impl AccessPolicy {
    pub fn new(grants: PermissionMap) -> Self {
        Self { grants }
    }

    /// Whether `role` holds `permission`, directly or through full access.
    pub fn allows(&self, role: Role, permission: Permission) -> bool {
        self.grants.get(&role).is_some_and(|granted| {
            granted
                .iter()
                .any(|p| *p == permission || *p == Permission::FullAccess)
        })
    }

    /// `Forbidden` unless `role` holds `permission`.
    pub fn authorize(&self, role: Role, permission: Permission) -> Result<()> {
        if self.allows(role, permission) {
            Ok(())
        } else {
            Err(StewardError::Forbidden(format!(
                "role '{}' lacks permission '{}'",
                role, permission
            )))
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(default_permissions())
    }
}

/// The authenticated principal behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }
}
