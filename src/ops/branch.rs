use crate::error::{Error, Result};
use crate::refs;
use crate::repo::Repo;

/// create a branch at HEAD, or list branches when no name is given
pub fn branch(repo: &Repo, name: Option<&str>) -> Result<String> {
    let Some(name) = name else {
        let current = refs::head_branch_name(repo)?;
        let listing = refs::local_heads(repo)?
            .keys()
            .map(|b| {
                let marker = if Some(b.as_str()) == current.as_deref() {
                    "* "
                } else {
                    "  "
                };
                format!("{marker}{b}")
            })
            .collect::<Vec<_>>()
            .join("\n");
        return Ok(listing);
    };

    let Some(head_hash) = refs::hash(repo, "HEAD")? else {
        let head_desc =
            refs::head_branch_name(repo)?.unwrap_or_else(|| "HEAD".to_string());
        return Err(Error::BranchPointMissing(head_desc));
    };

    if refs::exists(repo, &refs::local_ref(name))? {
        return Err(Error::BranchAlreadyExists(name.to_string()));
    }

    refs::write(repo, &refs::local_ref(name), &format!("{}\n", head_hash.to_hex()))?;
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::add::add;
    use crate::ops::commit::{commit, CommitOptions};
    use crate::worktree;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("repo"), false).unwrap();
        (dir, repo)
    }

    fn first_commit(repo: &Repo) {
        worktree::write_file(repo, "a.txt", b"1\n").unwrap();
        add(repo, "a.txt").unwrap();
        commit(
            repo,
            &CommitOptions {
                message: Some("c1".to_string()),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_branch_before_first_commit() {
        let (_dir, repo) = test_repo();
        let err = branch(&repo, Some("feat")).unwrap_err();
        assert_eq!(err.to_string(), "fatal: Not a valid object name: 'master'.");
    }

    #[test]
    fn test_branch_points_at_head() {
        let (_dir, repo) = test_repo();
        first_commit(&repo);

        branch(&repo, Some("feat")).unwrap();

        assert_eq!(
            refs::hash(&repo, "feat").unwrap(),
            refs::hash(&repo, "master").unwrap()
        );
    }

    #[test]
    fn test_branch_already_exists() {
        let (_dir, repo) = test_repo();
        first_commit(&repo);
        branch(&repo, Some("feat")).unwrap();

        let result = branch(&repo, Some("feat"));
        assert!(matches!(result, Err(Error::BranchAlreadyExists(_))));
    }

    #[test]
    fn test_branch_listing_marks_head() {
        let (_dir, repo) = test_repo();
        first_commit(&repo);
        branch(&repo, Some("feat")).unwrap();

        let listing = branch(&repo, None).unwrap();
        assert_eq!(listing, "  feat\n* master");
    }
}
