//! Path handling inside a commit's tree.
//!
//! - `normalize_path` / `split_path`: pure string utilities for user input
//! - `resolve`: descend a root tree to the object at a normalized path
//! - `resolve_oid`: same descent, but stop at the final entry's oid without
//!   loading the object it names (blame compares oids only)

use git2::Oid;

use crate::error::{AppError, Result};
use crate::git::object::{EntryKind, GitObject, Tree, TreeEntry};
use crate::git::store::ObjectStore;

/// Split a path into its non-empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Collapse separators, drop `.` and fold `..` (never above the root).
pub fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in split_path(path) {
        match segment {
            "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// Segments of an already normalized path. Anything `normalize_path` would
/// have changed is rejected.
pub fn segments(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let parts: Vec<&str> = path.split('/').collect();
    if parts.iter().any(|s| s.is_empty() || *s == "." || *s == "..") {
        return Err(AppError::InvalidArgument(format!("path is not normalized: {}", path)));
    }
    Ok(parts)
}

/// Resolve `path` below `root`. The empty path is the root tree itself.
pub fn resolve<S: ObjectStore + ?Sized>(store: &S, root: &Tree, path: &str) -> Result<Option<GitObject>> {
    let parts = segments(path)?;
    if parts.is_empty() {
        return Ok(Some(GitObject::Tree(root.clone())));
    }
    match walk_entries(store, root, &parts)? {
        Some(entry) => store.get(entry.oid),
        None => Ok(None),
    }
}

/// Oid at `path` below the tree `root_oid`; the empty path yields the root
/// itself. Used for cheap change detection.
pub fn resolve_oid<S: ObjectStore + ?Sized>(store: &S, root_oid: Oid, parts: &[&str]) -> Result<Option<Oid>> {
    if parts.is_empty() {
        return Ok(Some(root_oid));
    }
    let Some(root) = store.tree(root_oid)? else {
        return Ok(None);
    };
    Ok(walk_entries(store, &root, parts)?.map(|e| e.oid))
}

fn walk_entries<S: ObjectStore + ?Sized>(store: &S, root: &Tree, parts: &[&str]) -> Result<Option<TreeEntry>> {
    let Some((last, dirs)) = parts.split_last() else {
        return Ok(None);
    };

    let mut current: Option<Tree> = None;
    for dir in dirs {
        let tree = current.as_ref().unwrap_or(root);
        let Some(entry) = tree.get(dir) else {
            return Ok(None);
        };
        // Blobs and submodules cannot be descended into
        if entry.kind != EntryKind::Tree {
            return Ok(None);
        }
        match store.tree(entry.oid)? {
            Some(next) => current = Some(next),
            None => return Ok(None),
        }
    }

    let tree = current.as_ref().unwrap_or(root);
    Ok(tree.get(last).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::Fixture;

    fn root_of(fx: &Fixture, commit: Oid) -> Tree {
        let store = fx.store();
        let commit = store.commit(commit).unwrap().unwrap();
        store.tree(commit.tree).unwrap().unwrap()
    }

    #[test]
    fn normalizes_user_paths() {
        assert_eq!(normalize_path(""), "");
        assert_eq!(normalize_path("/"), "");
        assert_eq!(normalize_path("//a///b/"), "a/b");
        assert_eq!(normalize_path("a/./b/../c"), "a/c");
        assert_eq!(normalize_path("../../etc"), "etc");
    }

    #[test]
    fn rejects_unnormalized_paths() {
        assert!(segments("a//b").is_err());
        assert!(segments("/a").is_err());
        assert!(segments("a/../b").is_err());
        assert_eq!(segments("a/b").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn empty_path_is_root() {
        let fx = Fixture::new();
        let c = fx.commit(&[("a.txt", "a")], &[], 1, "c");
        let root = root_of(&fx, c);
        let store = fx.store();

        let obj = resolve(&store, &root, "").unwrap().unwrap();
        assert_eq!(obj, GitObject::Tree(root));
    }

    #[test]
    fn resolves_nested_blob() {
        let fx = Fixture::new();
        let c = fx.commit(&[("src/git/mod.rs", "pub mod x;\n"), ("README", "r")], &[], 1, "c");
        let root = root_of(&fx, c);
        let store = fx.store();

        match resolve(&store, &root, "src/git/mod.rs").unwrap() {
            Some(GitObject::Blob(blob)) => assert_eq!(blob.data, b"pub mod x;\n"),
            other => panic!("expected blob, got {:?}", other),
        }
        match resolve(&store, &root, "src/git").unwrap() {
            Some(GitObject::Tree(tree)) => assert!(tree.get("mod.rs").is_some()),
            other => panic!("expected tree, got {:?}", other),
        }
    }

    #[test]
    fn missing_segments_are_not_found() {
        let fx = Fixture::new();
        let c = fx.commit(&[("src/lib.rs", "x"), ("README", "r")], &[], 1, "c");
        let root = root_of(&fx, c);
        let store = fx.store();

        assert!(resolve(&store, &root, "nope").unwrap().is_none());
        assert!(resolve(&store, &root, "src/nope.rs").unwrap().is_none());
        // descending through a blob
        assert!(resolve(&store, &root, "README/inner").unwrap().is_none());
        // names are matched exactly
        assert!(resolve(&store, &root, "readme").unwrap().is_none());
    }

    #[test]
    fn submodules_are_opaque() {
        let fx = Fixture::new();
        let inner = fx.commit(&[("x", "x")], &[], 1, "inner");
        let mut builder = fx.repo().treebuilder(None).unwrap();
        builder.insert("vendor", inner, 0o160000).unwrap();
        let tree = builder.write().unwrap();
        let c = fx.commit_tree(tree, &[], 2, "with submodule");
        let root = root_of(&fx, c);
        let store = fx.store();

        assert_eq!(root.get("vendor").unwrap().kind, EntryKind::Submodule);
        assert_eq!(resolve_oid(&store, root.oid, &["vendor"]).unwrap(), Some(inner));
        assert!(resolve(&store, &root, "vendor/x").unwrap().is_none());
        assert!(resolve_oid(&store, root.oid, &["vendor", "x"]).unwrap().is_none());
    }

    #[test]
    fn resolving_whole_path_equals_stepwise() {
        let fx = Fixture::new();
        let c = fx.commit(&[("a/b/c/d.txt", "deep"), ("a/b/e.txt", "e")], &[], 1, "c");
        let root = root_of(&fx, c);
        let store = fx.store();

        for (prefix, rest) in [("a", "b/c/d.txt"), ("a/b", "c/d.txt"), ("a/b/c", "d.txt"), ("a/b", "e.txt")] {
            let whole = resolve(&store, &root, &format!("{}/{}", prefix, rest)).unwrap();
            let Some(GitObject::Tree(mid)) = resolve(&store, &root, prefix).unwrap() else {
                panic!("{} should be a tree", prefix);
            };
            let stepwise = resolve(&store, &mid, rest).unwrap();
            assert_eq!(whole, stepwise);
            assert!(whole.is_some());
        }
    }

    #[test]
    fn resolve_oid_matches_entries() {
        let fx = Fixture::new();
        let c = fx.commit(&[("a/b.txt", "b")], &[], 1, "c");
        let root = root_of(&fx, c);
        let store = fx.store();

        assert_eq!(resolve_oid(&store, root.oid, &[]).unwrap(), Some(root.oid));
        let a = root.get("a").unwrap().oid;
        assert_eq!(resolve_oid(&store, root.oid, &["a"]).unwrap(), Some(a));
        assert!(resolve_oid(&store, root.oid, &["a", "missing"]).unwrap().is_none());
    }
}
