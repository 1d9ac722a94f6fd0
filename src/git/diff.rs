//! Tree-level diff between two commits.
//!
//! Both trees are merge-joined entry by entry at every directory level. An
//! entry whose oid is identical on both sides is skipped together with its
//! whole subtree, so unchanged parts of large trees cost nothing. Leaf
//! changes between text blobs get a unified patch from libgit2; binary,
//! submodule and oversized leaves keep their status and sizes but no patch.

use git2::Oid;
use std::cmp::Ordering;
use std::path::Path;

use crate::error::Result;
use crate::git::blob::DEFAULT_MAX_BLOB_SIZE;
use crate::git::object::{Blob, Commit, EntryKind, Tree, TreeEntry};
use crate::git::store::ObjectStore;
use crate::models::{DiffHunk, DiffLine, DiffStatus, FileDiff, LineType};

#[derive(Debug, Clone, Copy)]
pub struct DiffOptions {
    pub context_lines: u32,
    /// Blobs larger than this get no textual patch
    pub max_blob_size: u64,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_lines: 3,
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
        }
    }
}

/// Changes from `from` to `to`, ordered by path. A missing `from` (root
/// commit) reports every path of `to` as added.
pub fn diff_commits<S: ObjectStore + ?Sized>(
    store: &S,
    from: Option<&Commit>,
    to: &Commit,
    opts: &DiffOptions,
) -> Result<Vec<FileDiff>> {
    diff_trees(store, from.map(|c| c.tree), Some(to.tree), opts)
}

pub fn diff_trees<S: ObjectStore + ?Sized>(
    store: &S,
    from: Option<Oid>,
    to: Option<Oid>,
    opts: &DiffOptions,
) -> Result<Vec<FileDiff>> {
    let mut diff = TreeDiff {
        store,
        opts,
        changes: Vec::new(),
    };

    if from == to {
        return Ok(diff.changes);
    }

    let old = diff.load_tree(from)?;
    let new = diff.load_tree(to)?;
    diff.trees("", old.as_ref(), new.as_ref())?;

    tracing::debug!("Diffed {:?}..{:?}: {} changed paths", from, to, diff.changes.len());
    Ok(diff.changes)
}

struct TreeDiff<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    opts: &'a DiffOptions,
    changes: Vec<FileDiff>,
}

impl<'a, S: ObjectStore + ?Sized> TreeDiff<'a, S> {
    fn trees(&mut self, prefix: &str, old: Option<&Tree>, new: Option<&Tree>) -> Result<()> {
        let old_entries = old.map(Tree::entries).unwrap_or(&[]);
        let new_entries = new.map(Tree::entries).unwrap_or(&[]);
        let (mut i, mut j) = (0, 0);

        loop {
            match (old_entries.get(i), new_entries.get(j)) {
                (None, None) => break,
                (Some(o), None) => {
                    self.removed(prefix, o)?;
                    i += 1;
                }
                (None, Some(n)) => {
                    self.added(prefix, n)?;
                    j += 1;
                }
                (Some(o), Some(n)) => match o.name.cmp(&n.name) {
                    Ordering::Less => {
                        self.removed(prefix, o)?;
                        i += 1;
                    }
                    Ordering::Greater => {
                        self.added(prefix, n)?;
                        j += 1;
                    }
                    Ordering::Equal => {
                        self.changed(prefix, o, n)?;
                        i += 1;
                        j += 1;
                    }
                },
            }
        }

        Ok(())
    }

    fn changed(&mut self, prefix: &str, old: &TreeEntry, new: &TreeEntry) -> Result<()> {
        if old.oid == new.oid && old.kind == new.kind {
            return Ok(());
        }

        let path = join_path(prefix, &new.name);
        match (old.kind, new.kind) {
            (EntryKind::Tree, EntryKind::Tree) => {
                let old_tree = self.load_tree(Some(old.oid))?;
                let new_tree = self.load_tree(Some(new.oid))?;
                self.trees(&path, old_tree.as_ref(), new_tree.as_ref())
            }
            // A directory replaced by a file or the other way round
            (EntryKind::Tree, _) | (_, EntryKind::Tree) => {
                self.removed(prefix, old)?;
                self.added(prefix, new)
            }
            _ => self.leaf(path, DiffStatus::Modified, Some(old), Some(new)),
        }
    }

    fn removed(&mut self, prefix: &str, entry: &TreeEntry) -> Result<()> {
        let path = join_path(prefix, &entry.name);
        if entry.is_tree() {
            let tree = self.load_tree(Some(entry.oid))?;
            self.trees(&path, tree.as_ref(), None)
        } else {
            self.leaf(path, DiffStatus::Deleted, Some(entry), None)
        }
    }

    fn added(&mut self, prefix: &str, entry: &TreeEntry) -> Result<()> {
        let path = join_path(prefix, &entry.name);
        if entry.is_tree() {
            let tree = self.load_tree(Some(entry.oid))?;
            self.trees(&path, None, tree.as_ref())
        } else {
            self.leaf(path, DiffStatus::Added, None, Some(entry))
        }
    }

    fn leaf(&mut self, path: String, status: DiffStatus, old: Option<&TreeEntry>, new: Option<&TreeEntry>) -> Result<()> {
        let old_blob = self.load_blob(old)?;
        let new_blob = self.load_blob(new)?;

        let is_submodule = [old, new]
            .into_iter()
            .flatten()
            .any(|e| e.kind == EntryKind::Submodule);
        let is_binary = [old_blob.as_ref(), new_blob.as_ref()]
            .into_iter()
            .flatten()
            .any(Blob::is_binary);
        let old_size = old_blob.as_ref().map(Blob::size);
        let new_size = new_blob.as_ref().map(Blob::size);
        let oversized = old_size.max(new_size).unwrap_or(0) > self.opts.max_blob_size;

        let patch = if is_submodule || is_binary || oversized {
            None
        } else {
            let empty: &[u8] = &[];
            text_patch(
                &path,
                status,
                old_blob.as_ref().map_or(empty, |b| b.data.as_slice()),
                new_blob.as_ref().map_or(empty, |b| b.data.as_slice()),
                self.opts.context_lines,
            )
        };

        let (text, hunks, insertions, deletions) = match patch {
            Some(p) => (Some(p.text), p.hunks, p.insertions, p.deletions),
            None => (None, Vec::new(), 0, 0),
        };

        self.changes.push(FileDiff {
            path,
            status,
            old_oid: old.map(|e| e.oid.to_string()),
            new_oid: new.map(|e| e.oid.to_string()),
            old_size,
            new_size,
            is_binary,
            patch: text,
            hunks,
            insertions,
            deletions,
        });
        Ok(())
    }

    fn load_tree(&self, oid: Option<Oid>) -> Result<Option<Tree>> {
        let Some(oid) = oid else { return Ok(None) };
        let tree = self.store.tree(oid)?;
        if tree.is_none() {
            tracing::warn!("Tree {} is missing from the object store", oid);
        }
        Ok(tree)
    }

    fn load_blob(&self, entry: Option<&TreeEntry>) -> Result<Option<Blob>> {
        match entry {
            Some(e) if e.kind == EntryKind::Blob => self.store.blob(e.oid),
            _ => Ok(None),
        }
    }
}

struct TextPatch {
    text: String,
    hunks: Vec<DiffHunk>,
    insertions: usize,
    deletions: usize,
}

/// Line-based unified patch. Any libgit2 failure degrades to no patch.
/// Callers have already ruled out binary blobs, so libgit2's own NUL-byte
/// heuristic is overridden.
fn text_patch(path: &str, status: DiffStatus, old: &[u8], new: &[u8], context_lines: u32) -> Option<TextPatch> {
    let mut opts = git2::DiffOptions::new();
    opts.context_lines(context_lines).force_text(true);

    let patch = match git2::Patch::from_buffers(old, Some(Path::new(path)), new, Some(Path::new(path)), Some(&mut opts)) {
        Ok(patch) => patch,
        Err(e) => {
            tracing::warn!("Could not compute patch for {}: {}", path, e);
            return None;
        }
    };
    let old_label = match status {
        DiffStatus::Added => "/dev/null".to_string(),
        _ => format!("a/{}", path),
    };
    let new_label = match status {
        DiffStatus::Deleted => "/dev/null".to_string(),
        _ => format!("b/{}", path),
    };

    let mut text = format!("--- {}\n+++ {}\n", old_label, new_label);
    let mut hunks = Vec::new();
    let mut insertions = 0;
    let mut deletions = 0;

    for hunk_idx in 0..patch.num_hunks() {
        let (hunk, _) = patch.hunk(hunk_idx).ok()?;
        let header = String::from_utf8_lossy(hunk.header()).trim_end().to_string();
        text.push_str(&header);
        text.push('\n');

        let mut lines = Vec::new();
        for line_idx in 0..patch.num_lines_in_hunk(hunk_idx).ok()? {
            let line = patch.line_in_hunk(hunk_idx, line_idx).ok()?;
            let origin = line.origin();
            let content = String::from_utf8_lossy(line.content()).to_string();

            let line_type = match origin {
                '+' => {
                    insertions += 1;
                    LineType::Addition
                }
                '-' => {
                    deletions += 1;
                    LineType::Deletion
                }
                ' ' => LineType::Context,
                _ => LineType::Header,
            };

            match line_type {
                LineType::Header => text.push_str(content.trim_start_matches('\n')),
                _ => {
                    text.push(origin);
                    text.push_str(&content);
                }
            }
            if !text.ends_with('\n') {
                text.push('\n');
            }

            lines.push(DiffLine {
                line_type,
                old_lineno: line.old_lineno(),
                new_lineno: line.new_lineno(),
                content,
            });
        }

        hunks.push(DiffHunk {
            old_start: hunk.old_start(),
            old_lines: hunk.old_lines(),
            new_start: hunk.new_start(),
            new_lines: hunk.new_lines(),
            header,
            lines,
        });
    }

    Some(TextPatch {
        text,
        hunks,
        insertions,
        deletions,
    })
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}
