//! Git fixtures for unit tests: a bare repository in a temp dir with
//! commits built directly from blobs and trees, with explicit timestamps.

use git2::{Oid, Repository, Signature, Time};
use std::collections::BTreeMap;
use tempfile::TempDir;

use crate::git::GitStore;

pub struct Fixture {
    dir: TempDir,
    repo: Repository,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init_bare(dir.path()).unwrap();
        Self { dir, repo }
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn store(&self) -> GitStore {
        GitStore::open(self.dir.path()).unwrap()
    }

    /// Commit a snapshot of text files given as `(path, content)`.
    pub fn commit(&self, files: &[(&str, &str)], parents: &[Oid], timestamp: i64, message: &str) -> Oid {
        let files: Vec<(String, Vec<u8>)> = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.as_bytes().to_vec()))
            .collect();
        self.commit_raw(files, parents, timestamp, message)
    }

    pub fn commit_raw(&self, files: Vec<(String, Vec<u8>)>, parents: &[Oid], timestamp: i64, message: &str) -> Oid {
        let tree = self.write_tree(files);
        self.commit_tree(tree, parents, timestamp, message)
    }

    pub fn commit_tree(&self, tree: Oid, parents: &[Oid], timestamp: i64, message: &str) -> Oid {
        let sig = Signature::new("Tester", "tester@example.com", &Time::new(timestamp, 0)).unwrap();
        let tree = self.repo.find_tree(tree).unwrap();
        let parents: Vec<git2::Commit> = parents.iter().map(|p| self.repo.find_commit(*p).unwrap()).collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        self.repo.commit(None, &sig, &sig, message, &tree, &parent_refs).unwrap()
    }

    /// Build nested trees from flat slash-separated paths.
    pub fn write_tree(&self, files: Vec<(String, Vec<u8>)>) -> Oid {
        let mut blobs: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        let mut dirs: BTreeMap<String, Vec<(String, Vec<u8>)>> = BTreeMap::new();

        for (path, data) in files {
            match path.split_once('/') {
                Some((dir, rest)) => dirs.entry(dir.to_string()).or_default().push((rest.to_string(), data)),
                None => {
                    blobs.insert(path, data);
                }
            }
        }

        let mut builder = self.repo.treebuilder(None).unwrap();
        for (name, data) in blobs {
            let oid = self.repo.blob(&data).unwrap();
            builder.insert(name, oid, 0o100644).unwrap();
        }
        for (name, children) in dirs {
            let oid = self.write_tree(children);
            builder.insert(name, oid, 0o040000).unwrap();
        }
        builder.write().unwrap()
    }

    pub fn set_head(&self, branch: &str, oid: Oid) {
        self.set_branch(branch, oid);
        self.repo.set_head(&format!("refs/heads/{}", branch)).unwrap();
    }

    pub fn set_branch(&self, branch: &str, oid: Oid) {
        self.repo
            .reference(&format!("refs/heads/{}", branch), oid, true, "fixture")
            .unwrap();
    }
}
