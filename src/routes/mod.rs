//! API route handlers - maps HTTP endpoints to git operations.
//!
//! Each submodule defines routes for a feature area:
//! - `auth`: Caller identification and the per-repository gate
//! - `repository`: Repository index and info
//! - `branches`: Branch listing
//! - `view`: Directory listing and file content at a revision
//! - `commits`: Commit history and single commits
//! - `diff`: Diff between revisions
//! - `manage`: Grants, visibility and repository details

pub mod auth;
pub mod branches;
pub mod commits;
pub mod diff;
pub mod manage;
pub mod repository;
pub mod view;

use axum::Router;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(repository::routes(state.clone()))
        .merge(branches::routes(state.clone()))
        .merge(view::routes(state.clone()))
        .merge(commits::routes(state.clone()))
        .merge(diff::routes(state.clone()))
        .merge(manage::routes(state))
}
