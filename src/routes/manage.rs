//! Repository management.
//!
//! - GET /api/v1/repos/{name}/manage
//!   Settings and each identity's explicit level. Managers only.
//!
//! - POST /api/v1/repos/{name}/manage { action: ..., ... }
//!   One of `update_grant` (alias `update_perm`), `set_visibility`
//!   (alias `publicize`) or `update_details`. Responds with the updated view.
//!   Rejected requests are 400 with the reason as the error message.

use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::auth::{CurrentUser, authorize_manage};
use crate::access::{ManageRequest, apply, explicit_permission, parse_request};
use crate::error::{AppError, Result};
use crate::models::{IdentityPermission, ManageView};
use crate::registry::Registry;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repos/{name}/manage", get(get_manage).post(post_manage))
        .with_state(state)
}

async fn get_manage(
    State(state): State<AppState>,
    Path(name): Path<String>,
    user: CurrentUser,
) -> Result<Json<ManageView>> {
    let registry = state.registry()?;
    authorize_manage(&registry, &name, &user)?;
    Ok(Json(manage_view(&registry, &name)?))
}

async fn post_manage(
    State(state): State<AppState>,
    Path(name): Path<String>,
    user: CurrentUser,
    body: Bytes,
) -> Result<Json<ManageView>> {
    let mut registry = state.registry_mut()?;
    let (_, manager) = authorize_manage(&registry, &name, &user)?;

    let request = parse_request(&body)?;
    let target = match &request {
        ManageRequest::UpdateDetails { name: renamed, .. } => renamed.clone(),
        _ => name.clone(),
    };

    tracing::info!("{} manages {}: {:?}", manager.username, name, request);
    registry.transact(|r| apply(r, &name, &manager, request))?;

    Ok(Json(manage_view(&registry, &target)?))
}

fn manage_view(registry: &Registry, name: &str) -> Result<ManageView> {
    let repo = registry
        .repository(name)
        .ok_or_else(|| AppError::RepoNotFound(name.to_string()))?;

    let identities = registry
        .identities()
        .map(|identity| IdentityPermission {
            id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            is_admin: identity.is_admin,
            permission: explicit_permission(repo, identity, registry),
        })
        .collect();

    Ok(ManageView {
        name: repo.name.clone(),
        description: repo.description.clone(),
        path: repo.path.display().to_string(),
        is_public: repo.is_public,
        identities,
    })
}
