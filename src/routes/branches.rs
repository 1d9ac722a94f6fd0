//! Branch listing.
//!
//! - GET /api/v1/repos/{name}/branches
//!   Local branches with the commit each points at, HEAD's branch flagged.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::auth::{CurrentUser, authorize};
use crate::error::Result;
use crate::git::ObjectStore;
use crate::models::{BranchInfo, CommitInfo};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repos/{name}/branches", get(list_branches))
        .with_state(state)
}

async fn list_branches(
    State(state): State<AppState>,
    Path(name): Path<String>,
    user: CurrentUser,
) -> Result<Json<Vec<BranchInfo>>> {
    let auth = authorize(&state, &name, &user)?;
    let store = auth.open()?;
    let head = store.head_branch();

    let mut branches = Vec::new();
    for (branch, oid) in store.heads()? {
        let last_commit = store.commit(oid)?.as_ref().map(CommitInfo::from);
        branches.push(BranchInfo {
            is_head: head.as_deref() == Some(branch.as_str()),
            name: branch,
            oid: oid.to_string(),
            last_commit,
        });
    }

    Ok(Json(branches))
}
