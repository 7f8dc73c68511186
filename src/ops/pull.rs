use crate::error::Result;
use crate::repo::Repo;
use crate::transport;

use super::merge::merge;

/// fetch a branch from a remote, then merge FETCH_HEAD
pub fn pull(repo: &Repo, remote: &str, branch: &str) -> Result<String> {
    repo.worktree()?;
    transport::fetch(repo, remote, branch)?;
    merge(repo, "FETCH_HEAD")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::add::add;
    use crate::ops::commit::{commit, CommitOptions};
    use crate::refs;
    use crate::worktree;
    use tempfile::tempdir;

    fn commit_file(repo: &Repo, path: &str, content: &[u8], message: &str) {
        worktree::write_file(repo, path, content).unwrap();
        add(repo, path).unwrap();
        commit(
            repo,
            &CommitOptions {
                message: Some(message.to_string()),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_pull_fast_forwards_onto_remote_work() {
        let dir = tempdir().unwrap();
        let src = Repo::init(&dir.path().join("src"), false).unwrap();
        commit_file(&src, "a.txt", b"1\n", "c1");

        let dst_path = dir.path().join("dst");
        transport::clone(
            dir.path().join("src").to_str().unwrap(),
            &dst_path,
            Default::default(),
        )
        .unwrap();
        let dst = Repo::open(&dst_path).unwrap();

        // new work lands on the source
        commit_file(&src, "b.txt", b"2\n", "c2");

        let out = pull(&dst, "origin", "master").unwrap();

        assert_eq!(out, "Fast-forward");
        assert_eq!(
            refs::hash(&dst, "master").unwrap(),
            refs::hash(&src, "master").unwrap()
        );
        assert_eq!(
            worktree::read_file(&dst, "b.txt").unwrap(),
            Some(b"2\n".to_vec())
        );
    }

    #[test]
    fn test_pull_when_up_to_date() {
        let dir = tempdir().unwrap();
        let src = Repo::init(&dir.path().join("src"), false).unwrap();
        commit_file(&src, "a.txt", b"1\n", "c1");

        let dst_path = dir.path().join("dst");
        transport::clone(
            dir.path().join("src").to_str().unwrap(),
            &dst_path,
            Default::default(),
        )
        .unwrap();
        let dst = Repo::open(&dst_path).unwrap();

        assert_eq!(pull(&dst, "origin", "master").unwrap(), "Already up-to-date");
    }
}
