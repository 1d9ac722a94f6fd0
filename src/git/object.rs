//! Owned, read-only views of git objects.
//!
//! `GitObject` is the tagged union handed out by an [`ObjectStore`]. Every
//! consumer matches on it exhaustively instead of probing object kinds.
//!
//! [`ObjectStore`]: crate::git::ObjectStore

use git2::Oid;

/// File mode bits used to classify tree entries.
pub const MODE_TYPE_MASK: u32 = 0o170000;
pub const MODE_TREE: u32 = 0o040000;
pub const MODE_SYMLINK: u32 = 0o120000;
pub const MODE_SUBMODULE: u32 = 0o160000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitObject {
    Commit(Commit),
    Tree(Tree),
    Blob(Blob),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    /// Offset from UTC in minutes
    pub offset_minutes: i32,
}

impl Signature {
    pub(crate) fn from_git(sig: &git2::Signature<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(sig.name_bytes()).into_owned(),
            email: String::from_utf8_lossy(sig.email_bytes()).into_owned(),
            timestamp: sig.when().seconds(),
            offset_minutes: sig.when().offset_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub oid: Oid,
    pub parents: Vec<Oid>,
    pub tree: Oid,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    pub fn short_oid(&self) -> String {
        let mut oid = self.oid.to_string();
        oid.truncate(8);
        oid
    }

    pub fn first_parent(&self) -> Option<Oid> {
        self.parents.first().copied()
    }

    /// First line of the message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Blob,
    Tree,
    Submodule,
}

impl EntryKind {
    pub fn from_mode(mode: u32) -> Self {
        match mode & MODE_TYPE_MASK {
            MODE_TREE => EntryKind::Tree,
            MODE_SUBMODULE => EntryKind::Submodule,
            // Regular files, executables and symlinks are all blobs
            _ => EntryKind::Blob,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub oid: Oid,
    pub mode: u32,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.kind == EntryKind::Tree
    }

    pub fn is_symlink(&self) -> bool {
        self.mode & MODE_TYPE_MASK == MODE_SYMLINK
    }
}

/// Directory object. Entries are kept sorted by name so two trees can be
/// merge-joined entry by entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub oid: Oid,
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(oid: Oid, mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.dedup_by(|a, b| a.name == b.name);
        Self { oid, entries }
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub oid: Oid,
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(oid: Oid, data: Vec<u8>) -> Self {
        Self { oid, data }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Content that does not decode as UTF-8 is treated as binary.
    pub fn is_binary(&self) -> bool {
        std::str::from_utf8(&self.data).is_err()
    }

    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}
