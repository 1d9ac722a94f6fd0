//! Commit DTOs.
//!
//! - `CommitInfo`: one row of a history listing or a "last change" annotation
//! - `CommitDetail`: full metadata for the commit page
//! - `CommitListResponse`: a bounded history listing

use serde::{Deserialize, Serialize};

use crate::git::Commit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub oid: String,
    pub short_oid: String,
    pub message: String,
    pub author: String,
    pub timestamp: i64,
    pub relative_time: String,
}

impl From<&Commit> for CommitInfo {
    fn from(commit: &Commit) -> Self {
        let timestamp = commit.committer.timestamp;
        CommitInfo {
            oid: commit.oid.to_string(),
            short_oid: commit.short_oid(),
            message: commit.summary().to_string(),
            author: commit.author.name.clone(),
            timestamp,
            relative_time: format_relative_time(timestamp),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub oid: String,
    pub short_oid: String,
    pub message: String,
    pub author: AuthorInfo,
    pub committer: AuthorInfo,
    pub timestamp: i64,
    pub relative_time: String,
    pub parents: Vec<String>,
}

impl From<&Commit> for CommitDetail {
    fn from(commit: &Commit) -> Self {
        let timestamp = commit.committer.timestamp;
        CommitDetail {
            oid: commit.oid.to_string(),
            short_oid: commit.short_oid(),
            message: commit.message.trim().to_string(),
            author: AuthorInfo {
                name: commit.author.name.clone(),
                email: commit.author.email.clone(),
            },
            committer: AuthorInfo {
                name: commit.committer.name.clone(),
                email: commit.committer.email.clone(),
            },
            timestamp,
            relative_time: format_relative_time(timestamp),
            parents: commit.parents.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitListResponse {
    pub rev: String,
    pub commits: Vec<CommitInfo>,
    /// The listing stopped at the limit; older commits exist
    pub has_more: bool,
}

pub fn format_relative_time(timestamp: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let diff = now - timestamp;

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        let mins = diff / 60;
        format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if diff < 86400 {
        let hours = diff / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if diff < 2592000 {
        let days = diff / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else if diff < 31536000 {
        let months = diff / 2592000;
        format!("{} month{} ago", months, if months == 1 { "" } else { "s" })
    } else {
        let years = diff / 31536000;
        format!("{} year{} ago", years, if years == 1 { "" } else { "s" })
    }
}
