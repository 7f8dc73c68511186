use std::collections::BTreeMap;
use std::fs;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::Toc;
use crate::repo::Repo;

/// stage 0: normally staged; stages 1/2/3: base/ours/theirs of a conflict
pub const STAGE_0: u8 = 0;
pub const STAGE_BASE: u8 = 1;
pub const STAGE_OURS: u8 = 2;
pub const STAGE_THEIRS: u8 = 3;

/// the staging area: a table of (path, stage) -> blob hash
///
/// invariant: a path never holds stage 0 together with any of stages 1..3.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Index {
    entries: BTreeMap<(String, u8), Hash>,
}

/// serialized record shape of one index entry
#[derive(Serialize, Deserialize)]
struct IndexEntry {
    path: String,
    stage: u8,
    hash: Hash,
}

impl Index {
    /// load the index; a missing file is the empty index
    pub fn load(repo: &Repo) -> Result<Self> {
        let path = repo.index_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default())
            }
            Err(e) => return Err(Error::Io { path, source: e }),
        };

        let records: Vec<IndexEntry> = ciborium::from_reader(&bytes[..])?;
        let entries = records
            .into_iter()
            .map(|r| ((r.path, r.stage), r.hash))
            .collect();
        Ok(Self { entries })
    }

    /// persist the index
    pub fn save(&self, repo: &Repo) -> Result<()> {
        let records: Vec<IndexEntry> = self
            .entries
            .iter()
            .map(|((path, stage), hash)| IndexEntry {
                path: path.clone(),
                stage: *stage,
                hash: *hash,
            })
            .collect();

        let mut bytes = Vec::new();
        ciborium::into_writer(&records, &mut bytes)?;
        repo.atomic_write(&repo.index_path(), &bytes)
    }

    /// table of contents over stage-0 entries
    pub fn toc(&self) -> Toc {
        self.entries
            .iter()
            .filter(|((_, stage), _)| *stage == STAGE_0)
            .map(|((path, _), hash)| (path.clone(), *hash))
            .collect()
    }

    pub fn has_file(&self, path: &str, stage: u8) -> bool {
        self.entries.contains_key(&(path.to_string(), stage))
    }

    pub fn stage_hash(&self, path: &str, stage: u8) -> Option<Hash> {
        self.entries.get(&(path.to_string(), stage)).copied()
    }

    /// a path is conflicted iff any of stages 1..3 is present for it
    pub fn is_file_in_conflict(&self, path: &str) -> bool {
        [STAGE_BASE, STAGE_OURS, STAGE_THEIRS]
            .iter()
            .any(|stage| self.has_file(path, *stage))
    }

    pub fn conflicted_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .entries
            .keys()
            .filter(|(_, stage)| *stage != STAGE_0)
            .map(|(path, _)| path.clone())
            .collect();
        paths.dedup();
        paths
    }

    /// is any path in the index
    pub fn tracked_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.entries.keys().map(|(p, _)| p.clone()).collect();
        paths.dedup();
        paths
    }

    /// index paths under a pathspec denoting a file or a directory prefix
    pub fn matching_files(&self, pathspec: &str) -> Vec<String> {
        self.tracked_paths()
            .into_iter()
            .filter(|p| {
                pathspec.is_empty()
                    || p == pathspec
                    || p.starts_with(&format!("{pathspec}/"))
            })
            .collect()
    }

    /// stage a path normally, clearing any conflict stages
    pub fn write_non_conflict(&mut self, path: &str, hash: Hash) {
        self.write_rm(path);
        self.entries.insert((path.to_string(), STAGE_0), hash);
    }

    /// mark a path conflicted with base/ours/theirs stages, clearing stage 0
    ///
    /// an absent side (deletion against modification) simply has no entry
    /// for its stage.
    pub fn write_conflict(
        &mut self,
        path: &str,
        base: Option<Hash>,
        ours: Option<Hash>,
        theirs: Option<Hash>,
    ) {
        self.write_rm(path);
        for (stage, hash) in [
            (STAGE_BASE, base),
            (STAGE_OURS, ours),
            (STAGE_THEIRS, theirs),
        ] {
            if let Some(hash) = hash {
                self.entries.insert((path.to_string(), stage), hash);
            }
        }
    }

    /// drop every stage of a path
    pub fn write_rm(&mut self, path: &str) {
        for stage in [STAGE_0, STAGE_BASE, STAGE_OURS, STAGE_THEIRS] {
            self.entries.remove(&(path.to_string(), stage));
        }
    }

    /// replace the whole index with a stage-0 toc
    pub fn replace_with_toc(&mut self, toc: &Toc) {
        self.entries = toc
            .iter()
            .map(|(path, hash)| ((path.clone(), STAGE_0), *hash))
            .collect();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("repo"), false).unwrap();
        (dir, repo)
    }

    fn h(n: u8) -> Hash {
        Hash::from_bytes([n; 32])
    }

    #[test]
    fn test_stage_zero_and_conflict_never_coexist() {
        let mut index = Index::default();

        index.write_non_conflict("a.txt", h(1));
        index.write_conflict("a.txt", Some(h(2)), Some(h(3)), Some(h(4)));

        assert!(!index.has_file("a.txt", STAGE_0));
        assert!(index.is_file_in_conflict("a.txt"));

        index.write_non_conflict("a.txt", h(5));
        assert!(index.has_file("a.txt", STAGE_0));
        assert!(!index.is_file_in_conflict("a.txt"));
        for stage in [STAGE_BASE, STAGE_OURS, STAGE_THEIRS] {
            assert!(!index.has_file("a.txt", stage));
        }
    }

    #[test]
    fn test_conflict_without_base() {
        let mut index = Index::default();

        index.write_conflict("a.txt", None, Some(h(1)), None);

        assert!(index.is_file_in_conflict("a.txt"));
        assert!(!index.has_file("a.txt", STAGE_BASE));
        assert!(index.has_file("a.txt", STAGE_OURS));
        assert!(!index.has_file("a.txt", STAGE_THEIRS));
    }

    #[test]
    fn test_toc_excludes_conflicts() {
        let mut index = Index::default();

        index.write_non_conflict("a.txt", h(1));
        index.write_conflict("b.txt", Some(h(2)), Some(h(3)), Some(h(4)));

        let toc = index.toc();
        assert_eq!(toc.len(), 1);
        assert_eq!(toc.get("a.txt"), Some(&h(1)));
    }

    #[test]
    fn test_conflicted_paths() {
        let mut index = Index::default();

        index.write_non_conflict("a.txt", h(1));
        index.write_conflict("b.txt", Some(h(2)), Some(h(3)), Some(h(4)));
        index.write_conflict("c.txt", None, Some(h(5)), Some(h(6)));

        assert_eq!(index.conflicted_paths(), vec!["b.txt", "c.txt"]);
    }

    #[test]
    fn test_matching_files() {
        let mut index = Index::default();
        index.write_non_conflict("a.txt", h(1));
        index.write_non_conflict("dir/b.txt", h(2));
        index.write_non_conflict("dir/sub/c.txt", h(3));
        index.write_non_conflict("directory.txt", h(4));

        assert_eq!(index.matching_files("a.txt"), vec!["a.txt"]);
        assert_eq!(
            index.matching_files("dir"),
            vec!["dir/b.txt", "dir/sub/c.txt"]
        );
        assert_eq!(index.matching_files(""), index.tracked_paths());
        assert!(index.matching_files("nope").is_empty());
    }

    #[test]
    fn test_write_rm() {
        let mut index = Index::default();
        index.write_conflict("a.txt", Some(h(1)), Some(h(2)), Some(h(3)));

        index.write_rm("a.txt");

        assert!(index.is_empty());
        assert!(!index.is_file_in_conflict("a.txt"));
    }

    #[test]
    fn test_replace_with_toc() {
        let mut index = Index::default();
        index.write_conflict("old.txt", Some(h(1)), Some(h(2)), Some(h(3)));

        let mut toc = Toc::new();
        toc.insert("new.txt".to_string(), h(4));
        index.replace_with_toc(&toc);

        assert_eq!(index.toc(), toc);
        assert!(index.conflicted_paths().is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (_dir, repo) = test_repo();

        let mut index = Index::default();
        index.write_non_conflict("a.txt", h(1));
        index.write_conflict("b.txt", Some(h(2)), Some(h(3)), Some(h(4)));
        index.save(&repo).unwrap();

        let loaded = Index::load(&repo).unwrap();
        assert_eq!(loaded, index);
    }

    #[test]
    fn test_load_missing_is_empty() {
        let (_dir, repo) = test_repo();
        assert!(Index::load(&repo).unwrap().is_empty());
    }
}
