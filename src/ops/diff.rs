use crate::diff::{name_status, toc_diff};
use crate::error::{Error, Result};
use crate::index::Index;
use crate::object::{self, Toc};
use crate::refs;
use crate::repo::Repo;
use crate::worktree;

/// name-status listing between two commits, the index and a commit, or the
/// index and the working copy
///
/// an omitted left side means the index toc; an omitted right side means
/// the working copy.
pub fn diff(repo: &Repo, ref1: Option<&str>, ref2: Option<&str>) -> Result<String> {
    repo.worktree()?;

    for r in [ref1, ref2].into_iter().flatten() {
        if refs::hash(repo, r)?.is_none() {
            return Err(Error::UnknownRevision(r.to_string()));
        }
    }

    let index = Index::load(repo)?;

    let left = side_toc(repo, &index, ref1)?;
    let right = match ref2 {
        Some(_) => side_toc(repo, &index, ref2)?,
        None => {
            let paths: Vec<String> = index.toc().into_keys().collect();
            worktree::working_copy_toc(repo, paths.iter())?
        }
    };

    Ok(name_status(&toc_diff(&left, &right)))
}

fn side_toc(repo: &Repo, index: &Index, r: Option<&str>) -> Result<Toc> {
    match r {
        Some(r) => {
            let hash = refs::hash(repo, r)?
                .ok_or_else(|| Error::UnknownRevision(r.to_string()))?;
            object::commit_toc(repo, &hash)
        }
        None => Ok(index.toc()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::add::add;
    use crate::ops::commit::{commit, CommitOptions};
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("repo"), false).unwrap();
        (dir, repo)
    }

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
    fn test_diff_unknown_revision() {
        let (_dir, repo) = test_repo();
        let result = diff(&repo, Some("ghost"), None);
        assert!(matches!(result, Err(Error::UnknownRevision(_))));
    }

    #[test]
    fn test_diff_index_against_working_copy() {
        let (_dir, repo) = test_repo();
        commit_file(&repo, "a.txt", b"1\n", "c1");

        assert_eq!(diff(&repo, None, None).unwrap(), "");

        worktree::write_file(&repo, "a.txt", b"edited\n").unwrap();
        assert_eq!(diff(&repo, None, None).unwrap(), "M a.txt");
    }

    #[test]
    fn test_diff_between_commits() {
        let (_dir, repo) = test_repo();
        commit_file(&repo, "a.txt", b"1\n", "c1");
        let c1 = refs::hash(&repo, "HEAD").unwrap().unwrap();

        commit_file(&repo, "b.txt", b"2\n", "c2");
        let c2 = refs::hash(&repo, "HEAD").unwrap().unwrap();

        let listing = diff(&repo, Some(&c1.to_hex()), Some(&c2.to_hex())).unwrap();
        assert_eq!(listing, "A b.txt");

        let listing = diff(&repo, Some(&c2.to_hex()), Some(&c1.to_hex())).unwrap();
        assert_eq!(listing, "D b.txt");
    }

    #[test]
    fn test_diff_head_against_working_copy() {
        let (_dir, repo) = test_repo();
        commit_file(&repo, "a.txt", b"1\n", "c1");

        worktree::write_file(&repo, "a.txt", b"staged\n").unwrap();
        add(&repo, "a.txt").unwrap();

        // HEAD on the left, index on the right via the working copy match
        let listing = diff(&repo, Some("HEAD"), None).unwrap();
        assert_eq!(listing, "M a.txt");
    }
}
