//! Read-only git access.
//!
//! - `store`: `ObjectStore` seam and the libgit2-backed `GitStore`
//! - `object`: `GitObject` tagged union (commit, tree, blob)
//! - `path`: path normalization and resolution through nested trees
//! - `revision`: branch names and object ids to commits
//! - `history`: merge-flattened chronological history
//! - `blame`: last commit that touched a path
//! - `diff`: tree-level diff with unified patches
//! - `blob`: blob presentation under a size ceiling

pub mod blame;
pub mod blob;
pub mod diff;
pub mod history;
pub mod object;
pub mod path;
pub mod revision;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use object::{Blob, Commit, EntryKind, GitObject, Signature, Tree, TreeEntry};
pub use store::{GitStore, ObjectStore};
