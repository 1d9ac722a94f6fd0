//! Read-only object access for a single repository.
//!
//! `ObjectStore` is the only seam through which the path resolver, history
//! walker, blame annotator and diff engine see git data. `GitStore` is the
//! libgit2-backed implementation, opened per request and never written to.

use git2::{BranchType, ErrorCode, ObjectType, Oid, Repository};
use std::path::Path;

use crate::error::{AppError, Result};
use crate::git::object::{Blob, Commit, EntryKind, GitObject, Signature, Tree, TreeEntry};

pub trait ObjectStore {
    /// Fetch an object by id. A missing object is `Ok(None)`.
    fn get(&self, oid: Oid) -> Result<Option<GitObject>>;

    /// Local branches as `(name, target)`, sorted by name.
    fn heads(&self) -> Result<Vec<(String, Oid)>>;

    /// Commit HEAD points at, `None` for an empty or orphan repository.
    fn head_oid(&self) -> Result<Option<Oid>>;

    fn commit(&self, oid: Oid) -> Result<Option<Commit>> {
        Ok(match self.get(oid)? {
            Some(GitObject::Commit(commit)) => Some(commit),
            _ => None,
        })
    }

    fn tree(&self, oid: Oid) -> Result<Option<Tree>> {
        Ok(match self.get(oid)? {
            Some(GitObject::Tree(tree)) => Some(tree),
            _ => None,
        })
    }

    fn blob(&self, oid: Oid) -> Result<Option<Blob>> {
        Ok(match self.get(oid)? {
            Some(GitObject::Blob(blob)) => Some(blob),
            _ => None,
        })
    }
}

pub struct GitStore {
    repo: Repository,
}

impl GitStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let repo = Repository::open(&path).map_err(|e| {
            tracing::warn!("Failed to open repository at {}: {}", path_str, e);
            AppError::RepoNotFound(path_str.clone())
        })?;

        Ok(Self { repo })
    }

    /// Short name of the branch HEAD points at, if HEAD is a branch.
    pub fn head_branch(&self) -> Option<String> {
        self.repo.head().ok().and_then(|h| {
            if h.is_branch() {
                h.shorthand().map(|s| s.to_string())
            } else {
                None
            }
        })
    }
}

impl ObjectStore for GitStore {
    fn get(&self, oid: Oid) -> Result<Option<GitObject>> {
        let obj = match self.repo.find_object(oid, None) {
            Ok(obj) => obj,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let object = match obj.kind() {
            Some(ObjectType::Commit) => {
                let Some(commit) = obj.as_commit() else { return Ok(None) };
                GitObject::Commit(Commit {
                    oid: commit.id(),
                    parents: commit.parent_ids().collect(),
                    tree: commit.tree_id(),
                    author: Signature::from_git(&commit.author()),
                    committer: Signature::from_git(&commit.committer()),
                    message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
                })
            }
            Some(ObjectType::Tree) => {
                let Some(tree) = obj.as_tree() else { return Ok(None) };
                let entries = tree
                    .iter()
                    .map(|entry| {
                        let mode = entry.filemode() as u32;
                        TreeEntry {
                            name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
                            oid: entry.id(),
                            mode,
                            kind: EntryKind::from_mode(mode),
                        }
                    })
                    .collect();
                GitObject::Tree(Tree::new(tree.id(), entries))
            }
            Some(ObjectType::Blob) => {
                let Some(blob) = obj.as_blob() else { return Ok(None) };
                GitObject::Blob(Blob::new(blob.id(), blob.content().to_vec()))
            }
            // Annotated tags and unknown kinds are not browsable objects
            _ => return Ok(None),
        };

        Ok(Some(object))
    }

    fn heads(&self) -> Result<Vec<(String, Oid)>> {
        let mut heads = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            let Some(name) = branch.name()?.map(|n| n.to_string()) else {
                continue;
            };
            if let Some(target) = branch.get().target() {
                heads.push((name, target));
            }
        }
        heads.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(heads)
    }

    fn head_oid(&self) -> Result<Option<Oid>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(head.peel_to_commit().ok().map(|c| c.id()))
    }
}
