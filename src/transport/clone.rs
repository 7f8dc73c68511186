//! clone: initialize a repository mirroring a remote path

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, IoResultExt, Result};
use crate::merge;
use crate::refs;
use crate::repo::Repo;

use super::fetch::fetch;

/// clone options
#[derive(Clone, Copy, Debug, Default)]
pub struct CloneOptions {
    pub bare: bool,
}

/// clone the repository at `remote_path` into `target_path`
///
/// registers the source as `origin` and, when the source has a `master`,
/// fetches it and fast-forwards the fresh `master` onto it.
pub fn clone(remote_path: &str, target_path: &Path, opts: CloneOptions) -> Result<String> {
    // the source must be an existing repository
    if Repo::open(Path::new(remote_path)).is_err() {
        return Err(Error::RemoteRepoMissing(remote_path.to_string()));
    }

    if target_path.exists() {
        let occupied = target_path.is_file()
            || fs::read_dir(target_path)
                .with_path(target_path)?
                .next()
                .is_some();
        if occupied {
            return Err(Error::TargetNotEmpty(target_path.to_path_buf()));
        }
    }

    let mut repo = Repo::init(target_path, opts.bare)?;
    repo.config_mut().add_remote("origin", remote_path)?;
    repo.save_config()?;
    debug!(remote = remote_path, target = %target_path.display(), "cloning");

    let source = Repo::open(Path::new(remote_path))?;
    if refs::hash(&source, "master")?.is_some() {
        fetch(&repo, "origin", "master")?;
        if let Some(remote_head) = refs::hash(&repo, "refs/remotes/origin/master")? {
            merge::write_fast_forward_merge(&repo, None, &remote_head)?;
        }
    }

    Ok(format!("Cloning into {}", target_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Hash;
    use crate::index::Index;
    use crate::object::{self, Object, Toc};
    use crate::worktree;
    use tempfile::tempdir;

    fn commit_of(repo: &Repo, files: &[(&str, &[u8])], parents: Vec<Hash>) -> Hash {
        let toc: Toc = files
            .iter()
            .map(|(path, data)| {
                let hash = object::write(repo, &Object::blob(data.to_vec())).unwrap();
                (path.to_string(), hash)
            })
            .collect();
        let tree = object::write_tree(repo, &object::nest(&toc)).unwrap();
        object::write_commit(repo, tree, "c", parents).unwrap()
    }

    #[test]
    fn test_clone_missing_source() {
        let dir = tempdir().unwrap();
        let result = clone(
            dir.path().join("nope").to_str().unwrap(),
            &dir.path().join("dst"),
            CloneOptions::default(),
        );
        assert!(matches!(result, Err(Error::RemoteRepoMissing(_))));
    }

    #[test]
    fn test_clone_refuses_non_empty_target() {
        let dir = tempdir().unwrap();
        Repo::init(&dir.path().join("src"), false).unwrap();

        let dst = dir.path().join("dst");
        fs::create_dir(&dst).unwrap();
        fs::write(dst.join("occupied"), b"x").unwrap();

        let result = clone(
            dir.path().join("src").to_str().unwrap(),
            &dst,
            CloneOptions::default(),
        );
        assert!(matches!(result, Err(Error::TargetNotEmpty(_))));
    }

    #[test]
    fn test_clone_mirrors_master() {
        let dir = tempdir().unwrap();
        let src = Repo::init(&dir.path().join("src"), false).unwrap();

        let c1 = commit_of(&src, &[("a.txt", b"1\n")], vec![]);
        refs::update_terminal(&src, "master", &c1).unwrap();

        let dst_path = dir.path().join("dst");
        let message = clone(
            dir.path().join("src").to_str().unwrap(),
            &dst_path,
            CloneOptions::default(),
        )
        .unwrap();
        assert!(message.starts_with("Cloning into "));

        let dst = Repo::open(&dst_path).unwrap();
        assert_eq!(
            dst.config().remote_url("origin"),
            dir.path().join("src").to_str()
        );
        assert_eq!(refs::hash(&dst, "master").unwrap(), Some(c1));
        assert_eq!(
            refs::hash(&dst, "refs/remotes/origin/master").unwrap(),
            Some(c1)
        );
        // the working copy and index carry the cloned content
        assert_eq!(
            worktree::read_file(&dst, "a.txt").unwrap(),
            Some(b"1\n".to_vec())
        );
        assert_eq!(
            Index::load(&dst).unwrap().toc(),
            object::commit_toc(&dst, &c1).unwrap()
        );
    }

    #[test]
    fn test_clone_empty_source() {
        let dir = tempdir().unwrap();
        Repo::init(&dir.path().join("src"), false).unwrap();

        let dst_path = dir.path().join("dst");
        clone(
            dir.path().join("src").to_str().unwrap(),
            &dst_path,
            CloneOptions::default(),
        )
        .unwrap();

        let dst = Repo::open(&dst_path).unwrap();
        assert_eq!(refs::hash(&dst, "master").unwrap(), None);
        assert_eq!(dst.config().remote_url("origin"), dir.path().join("src").to_str());
    }

    #[test]
    fn test_clone_bare_target() {
        let dir = tempdir().unwrap();
        let src = Repo::init(&dir.path().join("src"), false).unwrap();
        let c1 = commit_of(&src, &[("a.txt", b"1\n")], vec![]);
        refs::update_terminal(&src, "master", &c1).unwrap();

        let dst_path = dir.path().join("dst");
        clone(
            dir.path().join("src").to_str().unwrap(),
            &dst_path,
            CloneOptions { bare: true },
        )
        .unwrap();

        let dst = Repo::open(&dst_path).unwrap();
        assert!(dst.is_bare());
        assert_eq!(refs::hash(&dst, "master").unwrap(), Some(c1));
        // no working copy is materialized
        assert!(!dst_path.join("a.txt").exists());
    }
}
