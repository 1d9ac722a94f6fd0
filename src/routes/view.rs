//! Tree and blob view.
//!
//! GET /api/v1/repos/{name}/view?rev=<optional>&path=<optional>
//!
//! - A directory is listed directories-first, each entry annotated with
//!   the commit that last changed it
//! - A file comes back as text, a hex dump, or metadata only when it is
//!   larger than the configured ceiling, plus its last change

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::auth::{CurrentUser, authorize};
use crate::error::{AppError, Result};
use crate::git::blame::{last_change, last_changes};
use crate::git::blob::read_blob;
use crate::git::path::{normalize_path, resolve};
use crate::git::revision::resolve_revision;
use crate::git::{Commit, EntryKind, GitObject, GitStore, ObjectStore, Tree};
use crate::models::{CommitInfo, EntryType, TreeEntry, ViewResponse};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repos/{name}/view", get(get_view))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ViewQuery {
    rev: Option<String>,
    path: Option<String>,
}

async fn get_view(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ViewQuery>,
    user: CurrentUser,
) -> Result<Json<ViewResponse>> {
    let auth = authorize(&state, &name, &user)?;
    let store = auth.open()?;
    let path = normalize_path(query.path.as_deref().unwrap_or(""));

    let Some(commit) = resolve_revision(&store, query.rev.as_deref())? else {
        // Nothing committed yet: the root is an empty directory
        if path.is_empty() {
            return Ok(Json(ViewResponse::Tree {
                rev: "HEAD".to_string(),
                path,
                entries: Vec::new(),
            }));
        }
        return Err(AppError::PathNotFound(path));
    };

    let root = store
        .tree(commit.tree)?
        .ok_or_else(|| AppError::Internal(format!("commit {} has no tree", commit.oid)))?;

    let response = match resolve(&store, &root, &path)? {
        Some(GitObject::Tree(tree)) => ViewResponse::Tree {
            rev: commit.oid.to_string(),
            entries: list_tree(&store, &tree, &path, &commit)?,
            path,
        },
        Some(GitObject::Blob(blob)) => {
            let last = last_change(&store, &path, &commit)?;
            ViewResponse::Blob {
                rev: commit.oid.to_string(),
                blob: read_blob(&blob, state.config.max_blob_size),
                last_change: last.as_ref().map(CommitInfo::from),
                path,
            }
        }
        // Submodule commits are never browsed into
        Some(GitObject::Commit(_)) | None => return Err(AppError::PathNotFound(path)),
    };

    Ok(Json(response))
}

fn list_tree(store: &GitStore, tree: &Tree, dir: &str, commit: &Commit) -> Result<Vec<TreeEntry>> {
    let names: Vec<String> = tree.entries().iter().map(|e| e.name.clone()).collect();
    let mut changes = last_changes(store, dir, &names, commit)?;

    let mut entries = Vec::with_capacity(tree.len());
    for entry in tree.entries() {
        let entry_type = match entry.kind {
            EntryKind::Tree => EntryType::Directory,
            EntryKind::Submodule => EntryType::Submodule,
            EntryKind::Blob if entry.is_symlink() => EntryType::Symlink,
            EntryKind::Blob => EntryType::File,
        };

        let (size, is_binary) = match entry.kind {
            EntryKind::Blob => match store.blob(entry.oid)? {
                Some(blob) => (Some(blob.size()), Some(blob.is_binary())),
                None => (None, None),
            },
            _ => (None, None),
        };

        entries.push(TreeEntry {
            path: if dir.is_empty() {
                entry.name.clone()
            } else {
                format!("{}/{}", dir, entry.name)
            },
            name: entry.name.clone(),
            entry_type,
            oid: entry.oid.to_string(),
            size,
            is_binary,
            last_commit: changes.remove(&entry.name).as_ref().map(CommitInfo::from),
        });
    }

    // Directories first, then alphabetically
    entries.sort_by(|a, b| {
        let a_dir = a.entry_type == EntryType::Directory;
        let b_dir = b.entry_type == EntryType::Directory;
        b_dir.cmp(&a_dir).then_with(|| a.name.cmp(&b.name))
    });

    Ok(entries)
}
