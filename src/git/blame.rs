//! "Last touched by" annotations.
//!
//! Walks ancestry with the same frontier as the history listing and compares,
//! at every visited commit, what a path resolves to in that commit against
//! its first parent. The first commit where the two differ is the one that
//! last changed the path. A root commit counts as the change if the path
//! exists in it.

use git2::Oid;
use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::git::history::walk;
use crate::git::object::Commit;
use crate::git::path::{resolve_oid, segments};
use crate::git::store::ObjectStore;

/// Commit that last changed `path`, or `None` if `start` does not contain it.
pub fn last_change<S: ObjectStore + ?Sized>(store: &S, path: &str, start: &Commit) -> Result<Option<Commit>> {
    let parts = segments(path)?;

    if resolve_oid(store, start.tree, &parts)?.is_none() {
        return Ok(None);
    }

    for commit in walk(store, start.oid, usize::MAX)? {
        let commit = commit?;
        let current = resolve_oid(store, commit.tree, &parts)?;
        let previous = match first_parent_tree(store, &commit)? {
            Some(tree) => resolve_oid(store, tree, &parts)?,
            None => {
                if current.is_some() {
                    return Ok(Some(commit));
                }
                continue;
            }
        };

        if current != previous {
            return Ok(Some(commit));
        }
    }

    Ok(None)
}

/// Annotate the entries `names` of the directory `dir` in a single walk.
///
/// Commits that leave the directory's own oid untouched are skipped without
/// looking at individual entries. Names absent from `start` get no entry.
pub fn last_changes<S: ObjectStore + ?Sized>(
    store: &S,
    dir: &str,
    names: &[String],
    start: &Commit,
) -> Result<HashMap<String, Commit>> {
    let dir_parts = segments(dir)?;
    let mut results: HashMap<String, Commit> = HashMap::new();
    let mut remaining: HashSet<&str> = names.iter().map(|s| s.as_str()).collect();

    if remaining.is_empty() {
        return Ok(results);
    }

    for commit in walk(store, start.oid, usize::MAX)? {
        if remaining.is_empty() {
            break;
        }
        let commit = commit?;

        let current_dir = resolve_oid(store, commit.tree, &dir_parts)?;
        let parent_dir = match first_parent_tree(store, &commit)? {
            Some(tree) => resolve_oid(store, tree, &dir_parts)?,
            None => None,
        };

        if current_dir == parent_dir {
            continue;
        }

        let current = entry_oids(store, current_dir)?;
        let previous = entry_oids(store, parent_dir)?;

        let touched: Vec<&str> = remaining
            .iter()
            .copied()
            .filter(|name| current.get(*name) != previous.get(*name))
            .collect();

        for name in touched {
            remaining.remove(name);
            results.insert(name.to_string(), commit.clone());
        }
    }

    if !remaining.is_empty() {
        tracing::debug!("No last change found for {} entries under '{}'", remaining.len(), dir);
    }

    Ok(results)
}

fn first_parent_tree<S: ObjectStore + ?Sized>(store: &S, commit: &Commit) -> Result<Option<Oid>> {
    match commit.first_parent() {
        Some(parent) => Ok(store.commit(parent)?.map(|p| p.tree)),
        None => Ok(None),
    }
}

fn entry_oids<S: ObjectStore + ?Sized>(store: &S, tree: Option<Oid>) -> Result<HashMap<String, Oid>> {
    let Some(oid) = tree else {
        return Ok(HashMap::new());
    };
    Ok(match store.tree(oid)? {
        Some(tree) => tree.entries().iter().map(|e| (e.name.clone(), e.oid)).collect(),
        None => HashMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::Fixture;

    struct History {
        fx: Fixture,
        c1: Oid,
        c2: Oid,
        c3: Oid,
    }

    // c1: README, src/a.rs, src/b.rs
    // c2: src/a.rs changed
    // c3: README changed, docs/guide.md added
    fn history() -> History {
        let fx = Fixture::new();
        let c1 = fx.commit(&[("README", "r1"), ("src/a.rs", "a1"), ("src/b.rs", "b1")], &[], 100, "init");
        let c2 = fx.commit(&[("README", "r1"), ("src/a.rs", "a2"), ("src/b.rs", "b1")], &[c1], 200, "touch a");
        let c3 = fx.commit(
            &[("README", "r2"), ("src/a.rs", "a2"), ("src/b.rs", "b1"), ("docs/guide.md", "g")],
            &[c2],
            300,
            "readme and docs",
        );
        History { fx, c1, c2, c3 }
    }

    #[test]
    fn finds_last_change_of_files() {
        let h = history();
        let store = h.fx.store();
        let head = store.commit(h.c3).unwrap().unwrap();

        assert_eq!(last_change(&store, "README", &head).unwrap().unwrap().oid, h.c3);
        assert_eq!(last_change(&store, "src/a.rs", &head).unwrap().unwrap().oid, h.c2);
        assert_eq!(last_change(&store, "src/b.rs", &head).unwrap().unwrap().oid, h.c1);
        assert_eq!(last_change(&store, "docs/guide.md", &head).unwrap().unwrap().oid, h.c3);
    }

    #[test]
    fn directories_change_with_their_contents() {
        let h = history();
        let store = h.fx.store();
        let head = store.commit(h.c3).unwrap().unwrap();

        assert_eq!(last_change(&store, "src", &head).unwrap().unwrap().oid, h.c2);
        assert_eq!(last_change(&store, "", &head).unwrap().unwrap().oid, h.c3);
    }

    #[test]
    fn missing_path_has_no_annotation() {
        let h = history();
        let store = h.fx.store();
        let head = store.commit(h.c3).unwrap().unwrap();
        let first = store.commit(h.c1).unwrap().unwrap();

        assert!(last_change(&store, "nope", &head).unwrap().is_none());
        assert!(last_change(&store, "docs/guide.md", &first).unwrap().is_none());
    }

    #[test]
    fn deletion_and_readdition() {
        let fx = Fixture::new();
        let c1 = fx.commit(&[("keep", "k"), ("gone", "x")], &[], 10, "add");
        let c2 = fx.commit(&[("keep", "k")], &[c1], 20, "delete");
        let c3 = fx.commit(&[("keep", "k"), ("gone", "x")], &[c2], 30, "restore");
        let store = fx.store();
        let head = store.commit(c3).unwrap().unwrap();

        assert_eq!(last_change(&store, "gone", &head).unwrap().unwrap().oid, c3);
        assert_eq!(last_change(&store, "keep", &head).unwrap().unwrap().oid, c1);
    }

    #[test]
    fn merge_compares_against_first_parent() {
        let fx = Fixture::new();
        let base = fx.commit(&[("f", "base"), ("g", "g")], &[], 10, "base");
        let side = fx.commit(&[("f", "side"), ("g", "g")], &[base], 20, "side edits f");
        let main = fx.commit(&[("f", "base"), ("g", "g2")], &[base], 30, "main edits g");
        let merge = fx.commit(&[("f", "side"), ("g", "g2")], &[main, side], 40, "merge side");
        let store = fx.store();
        let head = store.commit(merge).unwrap().unwrap();

        // f differs from the first parent at the merge
        assert_eq!(last_change(&store, "f", &head).unwrap().unwrap().oid, merge);
        assert_eq!(last_change(&store, "g", &head).unwrap().unwrap().oid, main);
    }

    #[test]
    fn batch_annotation_matches_single_lookups() {
        let h = history();
        let store = h.fx.store();
        let head = store.commit(h.c3).unwrap().unwrap();

        let names: Vec<String> = ["README", "src", "docs"].iter().map(|s| s.to_string()).collect();
        let root = last_changes(&store, "", &names, &head).unwrap();
        assert_eq!(root["README"].oid, h.c3);
        assert_eq!(root["src"].oid, h.c2);
        assert_eq!(root["docs"].oid, h.c3);

        let names: Vec<String> = ["a.rs", "b.rs"].iter().map(|s| s.to_string()).collect();
        let src = last_changes(&store, "src", &names, &head).unwrap();
        assert_eq!(src["a.rs"].oid, h.c2);
        assert_eq!(src["b.rs"].oid, h.c1);

        for (name, commit) in &src {
            let single = last_change(&store, &format!("src/{}", name), &head).unwrap().unwrap();
            assert_eq!(single.oid, commit.oid);
        }
    }
}
