//! Repository index and header info.
//!
//! - GET /api/v1/repositories
//!   Every repository the caller can view, with its default branch.
//!
//! - GET /api/v1/repos/{name}
//!   Description, head branch and head commit of one repository.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::auth::{CurrentUser, authorize};
use crate::access::resolve;
use crate::error::Result;
use crate::git::history::walk_head;
use crate::git::GitStore;
use crate::models::{CommitInfo, RepositoryInfo, RepositorySummary};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repositories", get(list_repositories))
        .route("/api/v1/repos/{name}", get(get_repository_info))
        .with_state(state)
}

async fn list_repositories(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<RepositorySummary>>> {
    let registry = state.registry()?;
    let caller = user.caller(&registry);

    let summaries = registry
        .repositories()
        .filter_map(|repo| {
            let permission = resolve(repo, caller, &*registry);
            if !permission.can_view() {
                return None;
            }
            let default_branch = match GitStore::open(&repo.path) {
                Ok(store) => store.head_branch(),
                Err(_) => None,
            };
            Some(RepositorySummary {
                name: repo.name.clone(),
                description: repo.description.clone(),
                is_public: repo.is_public,
                default_branch,
                permission,
            })
        })
        .collect();

    Ok(Json(summaries))
}

async fn get_repository_info(
    State(state): State<AppState>,
    Path(name): Path<String>,
    user: CurrentUser,
) -> Result<Json<RepositoryInfo>> {
    let auth = authorize(&state, &name, &user)?;
    let store = auth.open()?;

    let head_commit = walk_head(&store, 1)?.into_iter().next();

    Ok(Json(RepositoryInfo {
        name: auth.repo.name.clone(),
        description: auth.repo.description.clone(),
        head_branch: store.head_branch(),
        is_empty: head_commit.is_none(),
        head_commit: head_commit.as_ref().map(CommitInfo::from),
        is_public: auth.repo.is_public,
        permission: auth.permission,
    }))
}
