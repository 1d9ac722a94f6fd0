//! Diff-related DTOs.
//!
//! - `DiffResponse`: Complete diff between two commits with summary stats
//! - `FileDiff`: Single path's change with patch text and hunks
//! - `DiffHunk`: Contiguous block of changes with context
//! - `DiffLine`: Single line (addition, deletion, or context)
//!
//! Renames are never detected: a moved file is a `Deleted` plus an `Added`.

use serde::{Deserialize, Serialize};

use super::CommitDetail;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffResponse {
    pub from_commit: Option<String>,
    pub to_commit: String,
    pub files: Vec<FileDiff>,
    pub stats: DiffStats,
}

/// Commit page: the commit itself and its changes against the first parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitChanges {
    pub commit: CommitDetail,
    pub files: Vec<FileDiff>,
    pub stats: DiffStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiff {
    pub path: String,
    pub status: DiffStatus,
    pub old_oid: Option<String>,
    pub new_oid: Option<String>,
    pub old_size: Option<u64>,
    pub new_size: Option<u64>,
    pub is_binary: bool,
    /// Unified patch; `None` for binary, submodule or oversized content
    pub patch: Option<String>,
    pub hunks: Vec<DiffHunk>,
    pub insertions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Deleted,
    Modified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub header: String,
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffLine {
    pub line_type: LineType,
    pub old_lineno: Option<u32>,
    pub new_lineno: Option<u32>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Context,
    Addition,
    Deletion,
    Header,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffStats {
    pub fn of(files: &[FileDiff]) -> Self {
        files.iter().fold(Self::default(), |mut stats, file| {
            stats.files_changed += 1;
            stats.insertions += file.insertions;
            stats.deletions += file.deletions;
            stats
        })
    }
}
