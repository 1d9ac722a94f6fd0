//! Data transfer objects (DTOs) for API responses.
//!
//! These structs are serialized to JSON for the rendering layer.
//! - `tree`: TreeEntry, ViewResponse, BlobView, RepositoryInfo, BranchInfo
//! - `commit`: CommitInfo, CommitDetail, CommitListResponse, AuthorInfo
//! - `diff`: DiffResponse, CommitChanges, FileDiff, DiffHunk, DiffLine
//! - `manage`: ManageView, IdentityPermission

pub mod commit;
pub mod diff;
pub mod manage;
pub mod tree;

pub use commit::*;
pub use diff::*;
pub use manage::*;
pub use tree::*;
