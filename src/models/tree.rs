//! Tree, blob and repository DTOs.
//!
//! - `TreeEntry`: Single file/directory in a listing, with its last change
//! - `ViewResponse`: What a path resolves to at a revision (tree or blob)
//! - `BlobView`: File content, hex dump, or metadata only when too large
//! - `RepositoryInfo` / `RepositorySummary`: Repo metadata (header, index)
//! - `BranchInfo`: Branch head with its commit

use serde::{Deserialize, Serialize};

use super::CommitInfo;
use crate::access::Permission;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub path: String,
    pub entry_type: EntryType,
    pub oid: String,
    pub size: Option<u64>,
    pub is_binary: Option<bool>,
    pub last_commit: Option<CommitInfo>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
    Symlink,
    Submodule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ViewResponse {
    Tree {
        rev: String,
        path: String,
        entries: Vec<TreeEntry>,
    },
    Blob {
        rev: String,
        path: String,
        blob: BlobView,
        last_change: Option<CommitInfo>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobView {
    pub oid: String,
    pub size: u64,
    pub is_binary: bool,
    /// Content omitted because the blob exceeds the size ceiling
    pub truncated: bool,
    pub content: Option<BlobContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlobContent {
    Text { text: String },
    HexDump { rows: Vec<HexRow> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HexRow {
    pub offset: String,
    pub columns: Vec<String>,
    pub ascii: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub description: String,
    pub head_branch: Option<String>,
    pub head_commit: Option<CommitInfo>,
    pub is_public: bool,
    pub is_empty: bool,
    pub permission: Permission,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub default_branch: Option<String>,
    pub permission: Permission,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub oid: String,
    pub is_head: bool,
    pub last_commit: Option<CommitInfo>,
}
