//! Management view DTOs.

use serde::{Deserialize, Serialize};

use crate::access::Permission;

/// Settings of one repository as seen by a manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManageView {
    pub name: String,
    pub description: String,
    pub path: String,
    pub is_public: bool,
    pub identities: Vec<IdentityPermission>,
}

/// Explicit level of an identity, regardless of repository visibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityPermission {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub permission: Permission,
}
