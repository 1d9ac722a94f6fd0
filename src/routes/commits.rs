//! Commit history and single-commit endpoints.
//!
//! - GET /api/v1/repos/{name}/commits?rev=<optional>&limit=<optional>
//!   Merge-flattened history, newest first, capped by the history limit.
//!
//! - GET /api/v1/repos/{name}/commit/{oid}
//!   Full commit metadata and its changes against the first parent.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::auth::{CurrentUser, authorize};
use crate::error::{AppError, Result};
use crate::git::diff::diff_commits;
use crate::git::history::walk;
use crate::git::revision::{parse_oid, resolve_revision};
use crate::git::ObjectStore;
use crate::models::{CommitChanges, CommitDetail, CommitInfo, CommitListResponse, DiffStats};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repos/{name}/commits", get(get_commits))
        .route("/api/v1/repos/{name}/commit/{oid}", get(get_commit))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CommitsQuery {
    rev: Option<String>,
    limit: Option<usize>,
}

async fn get_commits(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<CommitsQuery>,
    user: CurrentUser,
) -> Result<Json<CommitListResponse>> {
    let auth = authorize(&state, &name, &user)?;
    let store = auth.open()?;
    let limit = query
        .limit
        .unwrap_or(state.config.history_limit)
        .min(state.config.history_limit);

    let Some(start) = resolve_revision(&store, query.rev.as_deref())? else {
        return Ok(Json(CommitListResponse {
            rev: "HEAD".to_string(),
            commits: Vec::new(),
            has_more: false,
        }));
    };

    // One extra commit tells whether the listing was cut short
    let mut commits = walk(&store, start.oid, limit.saturating_add(1))?.collect::<Result<Vec<_>>>()?;
    let has_more = commits.len() > limit;
    commits.truncate(limit);

    tracing::debug!("Listed {} commits of {} from {}", commits.len(), name, start.oid);

    Ok(Json(CommitListResponse {
        rev: start.oid.to_string(),
        commits: commits.iter().map(CommitInfo::from).collect(),
        has_more,
    }))
}

async fn get_commit(
    State(state): State<AppState>,
    Path((name, oid)): Path<(String, String)>,
    user: CurrentUser,
) -> Result<Json<CommitChanges>> {
    let auth = authorize(&state, &name, &user)?;
    let store = auth.open()?;

    let oid = parse_oid(&oid)?;
    let commit = store
        .commit(oid)?
        .ok_or_else(|| AppError::CommitNotFound(oid.to_string()))?;
    let parent = match commit.first_parent() {
        Some(parent) => store.commit(parent)?,
        None => None,
    };

    let files = diff_commits(&store, parent.as_ref(), &commit, &state.config.diff_options())?;

    Ok(Json(CommitChanges {
        commit: CommitDetail::from(&commit),
        stats: DiffStats::of(&files),
        files,
    }))
}
