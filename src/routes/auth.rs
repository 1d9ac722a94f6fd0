//! Caller identification and the per-repository gate.
//!
//! Every repository route calls `authorize` (or `authorize_manage`) before it
//! touches git. A repository the caller may not see is reported exactly like
//! one that does not exist.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

use crate::access::{Caller, Permission, resolve};
use crate::error::{AppError, Result};
use crate::git::GitStore;
use crate::registry::{Identity, Registry, RepositoryRecord};
use crate::state::AppState;

/// Username from the trusted header, if present.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser {
    pub username: Option<String>,
}

impl CurrentUser {
    /// Registered identity; unknown usernames are anonymous.
    pub fn identity<'r>(&self, registry: &'r Registry) -> Option<&'r Identity> {
        self.username
            .as_deref()
            .and_then(|name| registry.identity_by_username(name))
    }

    pub fn caller<'r>(&self, registry: &'r Registry) -> Caller<'r> {
        match self.identity(registry) {
            Some(identity) => Caller::Identity(identity),
            None => Caller::Anonymous,
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(&state.config.user_header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(CurrentUser { username })
    }
}

/// A repository the caller is allowed to see, with the caller's level.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub repo: RepositoryRecord,
    pub permission: Permission,
    pub identity: Option<Identity>,
}

impl Authorized {
    pub fn open(&self) -> Result<GitStore> {
        GitStore::open(&self.repo.path).map_err(|_| AppError::RepoNotFound(self.repo.name.clone()))
    }
}

pub fn authorize(state: &AppState, name: &str, user: &CurrentUser) -> Result<Authorized> {
    let registry = state.registry()?;
    authorize_in(&registry, name, user)
}

pub fn authorize_in(registry: &Registry, name: &str, user: &CurrentUser) -> Result<Authorized> {
    let repo = registry
        .repository(name)
        .ok_or_else(|| AppError::RepoNotFound(name.to_string()))?;
    let caller = user.caller(registry);
    let permission = resolve(repo, caller, registry);

    if !permission.can_view() {
        tracing::debug!("Denied {:?} access to {}", user.username, name);
        return Err(AppError::RepoNotFound(name.to_string()));
    }

    Ok(Authorized {
        repo: repo.clone(),
        permission,
        identity: caller.identity().cloned(),
    })
}

/// Like `authorize_in`, but only managers get through.
pub fn authorize_manage(registry: &Registry, name: &str, user: &CurrentUser) -> Result<(Authorized, Identity)> {
    let auth = authorize_in(registry, name, user)?;
    match (&auth.identity, auth.permission.can_manage()) {
        (Some(identity), true) => {
            let identity = identity.clone();
            Ok((auth, identity))
        }
        _ => {
            tracing::debug!("Denied {:?} management of {}", user.username, name);
            Err(AppError::RepoNotFound(name.to_string()))
        }
    }
}
