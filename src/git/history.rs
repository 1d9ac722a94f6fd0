//! Merge-flattened commit history.
//!
//! `HistoryWalk` turns an arbitrary merge DAG into one chronological list:
//! a max-heap frontier keyed by committer timestamp (ties broken by discovery
//! order) is seeded with the start commit; each pop emits a commit and pushes
//! its unseen parents. Every commit is emitted once even when it is reachable
//! through several merge paths.
//!
//! The walk owns nothing but its frontier, so calling `walk` again with the
//! same arguments replays the same sequence.

use git2::Oid;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::error::{AppError, Result};
use crate::git::object::Commit;
use crate::git::store::ObjectStore;

struct Pending {
    timestamp: i64,
    seq: u64,
    commit: Commit,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // Newest first; among equal timestamps the earliest discovered wins
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct HistoryWalk<'s, S: ObjectStore + ?Sized> {
    store: &'s S,
    frontier: BinaryHeap<Pending>,
    seen: HashSet<Oid>,
    remaining: usize,
    discovered: u64,
}

/// Start a walk at `start`, yielding at most `max_count` commits.
pub fn walk<S: ObjectStore + ?Sized>(store: &S, start: Oid, max_count: usize) -> Result<HistoryWalk<'_, S>> {
    let commit = store
        .commit(start)?
        .ok_or_else(|| AppError::CommitNotFound(start.to_string()))?;

    let mut walk = HistoryWalk {
        store,
        frontier: BinaryHeap::new(),
        seen: HashSet::new(),
        remaining: max_count,
        discovered: 0,
    };
    walk.discover(commit);
    Ok(walk)
}

/// History from HEAD. A repository without HEAD has an empty history.
pub fn walk_head<S: ObjectStore + ?Sized>(store: &S, max_count: usize) -> Result<Vec<Commit>> {
    match store.head_oid()? {
        Some(head) => walk(store, head, max_count)?.collect(),
        None => Ok(Vec::new()),
    }
}

impl<'s, S: ObjectStore + ?Sized> HistoryWalk<'s, S> {
    fn discover(&mut self, commit: Commit) {
        if !self.seen.insert(commit.oid) {
            return;
        }
        self.frontier.push(Pending {
            timestamp: commit.committer.timestamp,
            seq: self.discovered,
            commit,
        });
        self.discovered += 1;
    }

    fn expand(&mut self, commit: &Commit) -> Result<()> {
        for parent in &commit.parents {
            if self.seen.contains(parent) {
                continue;
            }
            match self.store.commit(*parent)? {
                Some(parent) => self.discover(parent),
                // Shallow clones cut history short
                None => tracing::debug!("Skipping unreachable parent {} of {}", parent, commit.oid),
            }
        }
        Ok(())
    }
}

impl<'s, S: ObjectStore + ?Sized> Iterator for HistoryWalk<'s, S> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let Pending { commit, .. } = self.frontier.pop()?;
        self.remaining -= 1;

        // No need to look at parents once the cap is reached
        if self.remaining > 0 {
            if let Err(e) = self.expand(&commit) {
                self.frontier.clear();
                self.remaining = 0;
                return Some(Err(e));
            }
        }
        Some(Ok(commit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::Fixture;

    fn oids(commits: &[Commit]) -> Vec<Oid> {
        commits.iter().map(|c| c.oid).collect()
    }

    #[test]
    fn linear_history_is_newest_first() {
        let fx = Fixture::new();
        let mut chain = Vec::new();
        let mut parent: Vec<Oid> = Vec::new();
        for i in 1..=5 {
            let content = format!("v{}", i);
            let c = fx.commit(&[("file", content.as_str())], &parent, 1_000 * i, &format!("commit #{}", i));
            chain.push(c);
            parent = vec![c];
        }
        let store = fx.store();

        let commits: Vec<Commit> = walk(&store, chain[4], 100).unwrap().collect::<Result<_>>().unwrap();
        chain.reverse();
        assert_eq!(oids(&commits), chain);
        assert!(commits.windows(2).all(|w| w[0].committer.timestamp > w[1].committer.timestamp));
    }

    #[test]
    fn n_way_merge_is_flattened() {
        let fx = Fixture::new();
        let c1 = fx.commit(&[("f", "1")], &[], 100, "commit #1");
        let c2 = fx.commit(&[("f", "2")], &[c1], 200, "commit #2");
        let c3 = fx.commit(&[("f", "3")], &[c1], 300, "commit #3");
        let c4 = fx.commit(&[("f", "4")], &[c1], 400, "commit #4");
        let c5 = fx.commit(&[("f", "5")], &[c1], 500, "commit #5");
        let c6 = fx.commit(&[("f", "6")], &[c2, c3, c4, c5], 600, "commit #6");
        let store = fx.store();

        let commits: Vec<Commit> = walk(&store, c6, 100).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(oids(&commits), vec![c6, c5, c4, c3, c2, c1]);
        let messages: Vec<&str> = commits.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, ["commit #6", "commit #5", "commit #4", "commit #3", "commit #2", "commit #1"]);
    }

    #[test]
    fn diamond_emits_each_commit_once() {
        let fx = Fixture::new();
        let base = fx.commit(&[("f", "base")], &[], 10, "base");
        let left = fx.commit(&[("f", "left")], &[base], 20, "left");
        let right = fx.commit(&[("f", "right")], &[base], 30, "right");
        let merge = fx.commit(&[("f", "merge")], &[left, right], 40, "merge");
        let store = fx.store();

        let commits: Vec<Commit> = walk(&store, merge, 100).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(oids(&commits), vec![merge, right, left, base]);
    }

    #[test]
    fn equal_timestamps_follow_discovery_order() {
        let fx = Fixture::new();
        let base = fx.commit(&[("f", "base")], &[], 10, "base");
        let a = fx.commit(&[("f", "a")], &[base], 50, "a");
        let b = fx.commit(&[("f", "b")], &[base], 50, "b");
        let merge = fx.commit(&[("f", "m")], &[a, b], 60, "merge");
        let store = fx.store();

        let commits: Vec<Commit> = walk(&store, merge, 100).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(oids(&commits), vec![merge, a, b, base]);
    }

    #[test]
    fn respects_cap_and_replays() {
        let fx = Fixture::new();
        let mut parent: Vec<Oid> = Vec::new();
        let mut head = None;
        for i in 1..=10 {
            let content = i.to_string();
            let c = fx.commit(&[("f", content.as_str())], &parent, i, "c");
            parent = vec![c];
            head = Some(c);
        }
        let head = head.unwrap();
        let store = fx.store();

        let first: Vec<Commit> = walk(&store, head, 3).unwrap().collect::<Result<_>>().unwrap();
        let second: Vec<Commit> = walk(&store, head, 3).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(walk(&store, head, 0).unwrap().count(), 0);
    }

    #[test]
    fn start_must_be_a_commit() {
        let fx = Fixture::new();
        let c = fx.commit(&[("f", "x")], &[], 1, "c");
        let store = fx.store();
        let tree = store.commit(c).unwrap().unwrap().tree;

        assert!(matches!(walk(&store, tree, 10), Err(AppError::CommitNotFound(_))));
    }

    #[test]
    fn empty_repository_has_empty_history() {
        let fx = Fixture::new();
        let store = fx.store();
        assert!(walk_head(&store, 100).unwrap().is_empty());
    }
}
