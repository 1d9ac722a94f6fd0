//! Management requests.
//!
//! A request body is parsed once into a `ManageRequest`; `apply` then checks
//! the rules that depend on registry state and performs the mutation. The
//! caller is expected to have resolved `CanManage` already and to run `apply`
//! inside `Registry::transact` so the change is persisted atomically.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{Result, ValidationError};
use crate::registry::{Identity, IdentityId, Registry, is_valid_repo_name};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ManageRequest {
    /// Give (`visible`) or take away an identity's access.
    #[serde(alias = "update_perm")]
    UpdateGrant {
        #[serde(deserialize_with = "identity_id")]
        id: IdentityId,
        visible: bool,
        manage: bool,
    },

    #[serde(alias = "publicize")]
    SetVisibility { public: bool },

    UpdateDetails {
        name: String,
        path: PathBuf,
        #[serde(default, alias = "desc")]
        description: String,
    },
}

/// Identity ids arrive as numbers or as numeric strings from HTML forms.
fn identity_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<IdentityId, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(IdentityId),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(id) => Ok(id),
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid identity id: \"{}\"", text))),
    }
}

pub fn parse_request(body: &[u8]) -> std::result::Result<ManageRequest, ValidationError> {
    let request: ManageRequest =
        serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;

    if let ManageRequest::UpdateDetails { name, path, .. } = &request {
        if !is_valid_repo_name(name) {
            return Err(ValidationError::Malformed(format!("invalid repository name: \"{}\"", name)));
        }
        if path.as_os_str().is_empty() {
            return Err(ValidationError::Malformed("repository path must not be empty".to_string()));
        }
    }

    Ok(request)
}

/// Perform `request` on `repository` on behalf of `manager`.
pub fn apply(registry: &mut Registry, repository: &str, manager: &Identity, request: ManageRequest) -> Result<()> {
    match request {
        ManageRequest::UpdateGrant { id, visible, manage } => {
            let target = registry.identity(id).ok_or(ValidationError::UnknownIdentity)?;
            if target.id == manager.id {
                return Err(ValidationError::SelfModification.into());
            }
            if target.is_admin {
                return Err(ValidationError::TargetIsAdmin.into());
            }

            if visible {
                registry.upsert_grant(id, repository, manage);
            } else {
                registry.remove_grant(id, repository);
            }
            Ok(())
        }
        ManageRequest::SetVisibility { public } => registry.set_public(repository, public),
        ManageRequest::UpdateDetails { name, path, description } => {
            registry.update_details(repository, &name, path, description)
        }
    }
}
