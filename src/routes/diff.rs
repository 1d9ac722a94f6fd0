//! Diff between two revisions.
//!
//! GET /api/v1/repos/{name}/diff?from=<optional>&to=<optional>
//!
//! `to` defaults to HEAD; without `from` the diff is against the first
//! parent of `to` (everything is added for a root commit).

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::auth::{CurrentUser, authorize};
use crate::error::{AppError, Result};
use crate::git::diff::diff_commits;
use crate::git::revision::resolve_revision;
use crate::git::ObjectStore;
use crate::models::{DiffResponse, DiffStats};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repos/{name}/diff", get(get_diff))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct DiffQuery {
    from: Option<String>,
    to: Option<String>,
}

async fn get_diff(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<DiffQuery>,
    user: CurrentUser,
) -> Result<Json<DiffResponse>> {
    let auth = authorize(&state, &name, &user)?;
    let store = auth.open()?;

    let to = resolve_revision(&store, query.to.as_deref())?
        .ok_or_else(|| AppError::RevisionNotFound(query.to.clone().unwrap_or_else(|| "HEAD".to_string())))?;

    let from = match query.from.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(rev) => resolve_revision(&store, Some(rev))?,
        None => match to.first_parent() {
            Some(parent) => store.commit(parent)?,
            None => None,
        },
    };

    let files = diff_commits(&store, from.as_ref(), &to, &state.config.diff_options())?;

    Ok(Json(DiffResponse {
        from_commit: from.as_ref().map(|c| c.oid.to_string()),
        to_commit: to.oid.to_string(),
        stats: DiffStats::of(&files),
        files,
    }))
}
