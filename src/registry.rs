//! Repository, identity and grant records.
//!
//! The registry is a JSON file loaded at startup and held behind a single
//! `RwLock`. Every mutation runs through [`Registry::transact`], which
//! rewrites the file atomically (temp file + rename) and rolls the in-memory
//! state back if the write fails.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::access::GrantLookup;
use crate::error::{AppError, Result, ValidationError};

pub type IdentityId = u64;

pub type SharedRegistry = Arc<RwLock<Registry>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryRecord {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_public: bool,
}

/// A registered user. Email is required and unique across identities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grant {
    pub manage: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrantRecord {
    pub identity: IdentityId,
    pub repository: String,
    #[serde(default)]
    pub manage: bool,
}

/// On-disk layout of the registry file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub repositories: Vec<RepositoryRecord>,
    #[serde(default)]
    pub identities: Vec<Identity>,
    #[serde(default)]
    pub grants: Vec<GrantRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    repositories: BTreeMap<String, RepositoryRecord>,
    identities: BTreeMap<IdentityId, Identity>,
    grants: BTreeMap<(IdentityId, String), Grant>,
    file: Option<PathBuf>,
}

impl Registry {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let data: RegistryFile = serde_json::from_str(&contents)?;
        let mut registry = Self::from_data(data)?;
        registry.file = Some(path.to_path_buf());

        tracing::info!(
            "Loaded registry {}: {} repositories, {} identities, {} grants",
            path.display(),
            registry.repositories.len(),
            registry.identities.len(),
            registry.grants.len()
        );
        Ok(registry)
    }

    /// Build an in-memory registry, validating every record.
    pub fn from_data(data: RegistryFile) -> Result<Self> {
        let mut registry = Registry::default();

        for repo in data.repositories {
            if !is_valid_repo_name(&repo.name) {
                return Err(AppError::Registry(format!("invalid repository name: {:?}", repo.name)));
            }
            if registry.repositories.contains_key(&repo.name) {
                return Err(AppError::Registry(format!("duplicate repository: {}", repo.name)));
            }
            registry.repositories.insert(repo.name.clone(), repo);
        }

        let mut usernames = HashSet::new();
        let mut emails = HashSet::new();
        for identity in data.identities {
            let email = identity.email.trim().to_lowercase();
            if email.is_empty() || !email.contains('@') {
                return Err(AppError::Registry(format!(
                    "identity {} needs a valid email address",
                    identity.username
                )));
            }
            if !emails.insert(email) {
                return Err(AppError::Registry(format!("duplicate email: {}", identity.email)));
            }
            if !usernames.insert(identity.username.clone()) {
                return Err(AppError::Registry(format!("duplicate username: {}", identity.username)));
            }
            if registry.identities.contains_key(&identity.id) {
                return Err(AppError::Registry(format!("duplicate identity id: {}", identity.id)));
            }
            registry.identities.insert(identity.id, identity);
        }

        for grant in data.grants {
            if !registry.identities.contains_key(&grant.identity) {
                return Err(AppError::Registry(format!("grant for unknown identity {}", grant.identity)));
            }
            if !registry.repositories.contains_key(&grant.repository) {
                return Err(AppError::Registry(format!("grant for unknown repository {}", grant.repository)));
            }
            let key = (grant.identity, grant.repository);
            if registry.grants.contains_key(&key) {
                return Err(AppError::Registry(format!("duplicate grant for identity {} on {}", key.0, key.1)));
            }
            registry.grants.insert(key, Grant { manage: grant.manage });
        }

        Ok(registry)
    }

    pub fn to_data(&self) -> RegistryFile {
        RegistryFile {
            repositories: self.repositories.values().cloned().collect(),
            identities: self.identities.values().cloned().collect(),
            grants: self
                .grants
                .iter()
                .map(|((identity, repository), grant)| GrantRecord {
                    identity: *identity,
                    repository: repository.clone(),
                    manage: grant.manage,
                })
                .collect(),
        }
    }

    /// Persist to the backing file, if any.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.to_data())?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Apply `f` and persist. On any failure the registry is left unchanged.
    pub fn transact<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Registry) -> Result<T>,
    {
        let snapshot = self.clone();
        let result = f(self).and_then(|value| {
            self.save()?;
            Ok(value)
        });
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    pub fn repository(&self, name: &str) -> Option<&RepositoryRecord> {
        self.repositories.get(name)
    }

    pub fn repositories(&self) -> impl Iterator<Item = &RepositoryRecord> {
        self.repositories.values()
    }

    pub fn identity(&self, id: IdentityId) -> Option<&Identity> {
        self.identities.get(&id)
    }

    pub fn identity_by_username(&self, username: &str) -> Option<&Identity> {
        self.identities.values().find(|i| i.username == username)
    }

    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.identities.values()
    }

    pub fn upsert_grant(&mut self, identity: IdentityId, repository: &str, manage: bool) {
        tracing::info!("Grant on {} for identity {} (manage: {})", repository, identity, manage);
        self.grants
            .insert((identity, repository.to_string()), Grant { manage });
    }

    /// Returns whether a grant existed.
    pub fn remove_grant(&mut self, identity: IdentityId, repository: &str) -> bool {
        let removed = self.grants.remove(&(identity, repository.to_string())).is_some();
        if removed {
            tracing::info!("Revoked grant on {} for identity {}", repository, identity);
        }
        removed
    }

    pub fn set_public(&mut self, repository: &str, is_public: bool) -> Result<()> {
        let record = self
            .repositories
            .get_mut(repository)
            .ok_or_else(|| AppError::RepoNotFound(repository.to_string()))?;
        record.is_public = is_public;
        tracing::info!("Repository {} is now {}", repository, if is_public { "public" } else { "private" });
        Ok(())
    }

    /// Update location and description. A new name replaces the record
    /// (visibility is kept); grants on the old name are dropped, not moved.
    ///
    /// The path is not confined: a manager can point their record at any
    /// directory the server can read, including another repository's.
    pub fn update_details(&mut self, repository: &str, name: &str, path: PathBuf, description: String) -> Result<()> {
        if !self.repositories.contains_key(repository) {
            return Err(AppError::RepoNotFound(repository.to_string()));
        }

        if let Some(other) = self.repositories.values().find(|r| r.name != repository && r.path == path) {
            tracing::warn!(
                "Repository {} now points at {}, already registered as {}",
                repository,
                path.display(),
                other.name
            );
        }

        if name == repository {
            if let Some(record) = self.repositories.get_mut(repository) {
                record.path = path;
                record.description = description;
            }
            return Ok(());
        }

        if !is_valid_repo_name(name) {
            return Err(ValidationError::Malformed(format!("invalid repository name: \"{}\"", name)).into());
        }
        if self.repositories.contains_key(name) {
            return Err(ValidationError::NameTaken(name.to_string()).into());
        }

        let Some(old) = self.repositories.remove(repository) else {
            return Err(AppError::RepoNotFound(repository.to_string()));
        };
        self.repositories.insert(
            name.to_string(),
            RepositoryRecord {
                name: name.to_string(),
                path,
                description,
                is_public: old.is_public,
            },
        );

        let before = self.grants.len();
        self.grants.retain(|(_, repo), _| repo != repository);
        let dropped = before - self.grants.len();
        tracing::warn!(
            "Repository {} renamed to {}; {} grant(s) on the old name dropped",
            repository,
            name,
            dropped
        );
        Ok(())
    }
}

impl GrantLookup for Registry {
    fn grant(&self, identity: IdentityId, repository: &str) -> Option<Grant> {
        self.grants.get(&(identity, repository.to_string())).copied()
    }
}

/// Names are restricted to `[-_.A-Za-z0-9]`, and never `.` or `..`.
pub fn is_valid_repo_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> RegistryFile {
        serde_json::from_str(
            r#"{
                "repositories": [
                    { "name": "linear", "path": "/srv/git/linear", "is_public": false },
                    { "name": "docs", "path": "/srv/git/docs", "description": "Docs", "is_public": true }
                ],
                "identities": [
                    { "id": 1, "username": "admin", "email": "admin@example.com", "is_admin": true },
                    { "id": 2, "username": "manager", "email": "manager@example.com" },
                    { "id": 3, "username": "viewer", "email": "viewer@example.com" }
                ],
                "grants": [
                    { "identity": 2, "repository": "linear", "manage": true },
                    { "identity": 3, "repository": "linear" }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn loads_records() {
        let registry = Registry::from_data(sample()).unwrap();
        assert_eq!(registry.repositories().count(), 2);
        assert!(registry.identity(1).unwrap().is_admin);
        assert_eq!(registry.identity_by_username("viewer").unwrap().id, 3);
        assert_eq!(registry.grant(2, "linear"), Some(Grant { manage: true }));
        assert_eq!(registry.grant(3, "linear"), Some(Grant { manage: false }));
        assert_eq!(registry.grant(3, "docs"), None);
    }

    #[test]
    fn rejects_duplicate_or_missing_emails() {
        let mut data = sample();
        data.identities[2].email = "Manager@example.com".into();
        assert!(matches!(Registry::from_data(data), Err(AppError::Registry(_))));

        let mut data = sample();
        data.identities[1].email = "  ".into();
        assert!(matches!(Registry::from_data(data), Err(AppError::Registry(_))));
    }

    #[test]
    fn rejects_dangling_and_duplicate_grants() {
        let mut data = sample();
        data.grants.push(GrantRecord {
            identity: 9,
            repository: "linear".into(),
            manage: false,
        });
        assert!(Registry::from_data(data).is_err());

        let mut data = sample();
        data.grants.push(GrantRecord {
            identity: 3,
            repository: "linear".into(),
            manage: true,
        });
        assert!(Registry::from_data(data).is_err());
    }

    #[test]
    fn grant_upsert_and_idempotent_removal() {
        let mut registry = Registry::from_data(sample()).unwrap();
        registry.upsert_grant(3, "docs", false);
        registry.upsert_grant(3, "docs", true);
        assert_eq!(registry.grant(3, "docs"), Some(Grant { manage: true }));

        assert!(registry.remove_grant(3, "docs"));
        assert!(!registry.remove_grant(3, "docs"));
        assert_eq!(registry.grant(3, "docs"), None);
    }

    #[test]
    fn visibility_change_keeps_grants() {
        let mut registry = Registry::from_data(sample()).unwrap();
        registry.set_public("linear", true).unwrap();
        assert!(registry.repository("linear").unwrap().is_public);
        assert_eq!(registry.grant(3, "linear"), Some(Grant { manage: false }));
    }

    #[test]
    fn rename_recreates_record_and_drops_grants() {
        let mut registry = Registry::from_data(sample()).unwrap();
        registry
            .update_details("linear", "straight", "/srv/git/straight".into(), "Moved".into())
            .unwrap();

        assert!(registry.repository("linear").is_none());
        let renamed = registry.repository("straight").unwrap();
        assert!(!renamed.is_public);
        assert_eq!(renamed.description, "Moved");
        assert_eq!(registry.grant(2, "linear"), None);
        assert_eq!(registry.grant(2, "straight"), None);

        let err = registry
            .update_details("straight", "docs", "/x".into(), String::new())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::NameTaken(_))));
    }

    #[test]
    fn path_shared_with_another_repository_is_allowed() {
        let mut registry = Registry::from_data(sample()).unwrap();
        registry
            .update_details("linear", "linear", "/srv/git/docs".into(), String::new())
            .unwrap();

        assert_eq!(registry.repository("linear").unwrap().path, PathBuf::from("/srv/git/docs"));
        assert_eq!(registry.repository("docs").unwrap().path, PathBuf::from("/srv/git/docs"));
        assert!(!registry.repository("linear").unwrap().is_public);
    }

    #[test]
    fn saves_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, serde_json::to_string(&sample()).unwrap()).unwrap();

        let mut registry = Registry::load(&path).unwrap();
        registry
            .transact(|r| {
                r.upsert_grant(3, "docs", true);
                Ok(())
            })
            .unwrap();

        let reloaded = Registry::load(&path).unwrap();
        assert_eq!(reloaded.grant(3, "docs"), Some(Grant { manage: true }));
    }

    #[test]
    fn failed_write_rolls_back() {
        let dir = TempDir::new().unwrap();
        let mut registry = Registry::from_data(sample()).unwrap();
        registry.file = Some(dir.path().join("missing").join("registry.json"));

        let result = registry.transact(|r| r.set_public("linear", true));
        assert!(result.is_err());
        assert!(!registry.repository("linear").unwrap().is_public);
    }
}
