//! Permission resolution.
//!
//! The effective level for a caller on a repository is the highest of:
//! - `CanManage` if the caller is an administrator
//! - the caller's explicit grant, if any
//! - `CanView` if the repository is public
//!
//! and `NoAccess` otherwise. Anonymous callers only ever get the public floor.

use serde::{Deserialize, Serialize};

use crate::registry::{Grant, Identity, IdentityId, RepositoryRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    NoAccess,
    CanView,
    CanManage,
}

impl Permission {
    pub fn can_view(self) -> bool {
        self >= Permission::CanView
    }

    pub fn can_manage(self) -> bool {
        self == Permission::CanManage
    }
}

impl From<Grant> for Permission {
    fn from(grant: Grant) -> Self {
        if grant.manage {
            Permission::CanManage
        } else {
            Permission::CanView
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Caller<'a> {
    Anonymous,
    Identity(&'a Identity),
}

impl<'a> Caller<'a> {
    pub fn identity(&self) -> Option<&'a Identity> {
        match self {
            Caller::Anonymous => None,
            Caller::Identity(identity) => Some(identity),
        }
    }
}

/// Source of explicit grants.
pub trait GrantLookup {
    fn grant(&self, identity: IdentityId, repository: &str) -> Option<Grant>;
}

/// The level granted explicitly to `identity`, ignoring visibility.
/// Administrators always manage.
pub fn explicit_permission<G: GrantLookup + ?Sized>(
    repository: &RepositoryRecord,
    identity: &Identity,
    grants: &G,
) -> Permission {
    if identity.is_admin {
        return Permission::CanManage;
    }
    grants
        .grant(identity.id, &repository.name)
        .map(Permission::from)
        .unwrap_or(Permission::NoAccess)
}

pub fn resolve<G: GrantLookup + ?Sized>(repository: &RepositoryRecord, caller: Caller<'_>, grants: &G) -> Permission {
    let floor = if repository.is_public {
        Permission::CanView
    } else {
        Permission::NoAccess
    };

    match caller {
        Caller::Anonymous => floor,
        Caller::Identity(identity) => explicit_permission(repository, identity, grants).max(floor),
    }
}
