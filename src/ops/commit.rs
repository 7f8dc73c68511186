use crate::error::{Error, Result};
use crate::index::Index;
use crate::merge;
use crate::object::{self, Object};
use crate::refs;
use crate::repo::Repo;

/// commit options
#[derive(Clone, Debug, Default)]
pub struct CommitOptions {
    pub message: Option<String>,
}

/// commit the index
///
/// writes the stage-0 toc as a tree, refuses empty commits and unresolved
/// conflicts, then records the commit and moves HEAD. a commit that closes
/// a merge takes its message from MERGE_MSG and clears the merge state.
pub fn commit(repo: &Repo, opts: &CommitOptions) -> Result<String> {
    repo.worktree()?;

    let index = Index::load(repo)?;
    let tree_hash = object::write_tree(repo, &object::nest(&index.toc()))?;

    let head_desc = refs::head_branch_name(repo)?
        .unwrap_or_else(|| "detached HEAD".to_string());

    if let Some(head_hash) = refs::hash(repo, "HEAD")? {
        if let Some(Object::Commit { tree, .. }) = object::read(repo, &head_hash)? {
            if tree == tree_hash {
                return Err(Error::NothingToCommit(head_desc));
            }
        }
    }

    let merging = refs::is_merge_in_progress(repo)?;
    let conflicted = index.conflicted_paths();
    if merging && !conflicted.is_empty() {
        return Err(Error::UnresolvedConflicts(conflicted));
    }

    let message = if merging {
        merge::read_merge_msg(repo)?
            .ok_or_else(|| Error::MalformedRef("MERGE_MSG".to_string()))?
    } else {
        opts.message.clone().unwrap_or_default()
    };

    let parents = refs::commit_parent_hashes(repo)?;
    let commit_hash = object::write_commit(repo, tree_hash, &message, parents)?;
    refs::update_terminal(repo, "HEAD", &commit_hash)?;

    if merging {
        merge::clear_merge_state(repo)?;
        return Ok("Merge made by the three-way strategy".to_string());
    }

    Ok(format!(
        "[{} {}] {}",
        head_desc,
        commit_hash,
        opts.message.as_deref().unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::add::add;
    use crate::worktree;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("repo"), false).unwrap();
        (dir, repo)
    }

    fn msg(m: &str) -> CommitOptions {
        CommitOptions {
            message: Some(m.to_string()),
        }
    }

    #[test]
    fn test_first_commit() {
        let (_dir, repo) = test_repo();
        worktree::write_file(&repo, "a.txt", b"1\n").unwrap();
        add(&repo, "a.txt").unwrap();

        let out = commit(&repo, &msg("c1")).unwrap();

        let head = refs::hash(&repo, "HEAD").unwrap().unwrap();
        assert_eq!(out, format!("[master {head}] c1"));

        let Some(Object::Commit { parents, message, .. }) =
            object::read(&repo, &head).unwrap()
        else {
            panic!("expected commit");
        };
        assert!(parents.is_empty());
        assert_eq!(message, "c1");
    }

    #[test]
    fn test_second_commit_links_parent() {
        let (_dir, repo) = test_repo();
        worktree::write_file(&repo, "a.txt", b"1\n").unwrap();
        add(&repo, "a.txt").unwrap();
        commit(&repo, &msg("c1")).unwrap();
        let c1 = refs::hash(&repo, "HEAD").unwrap().unwrap();

        worktree::write_file(&repo, "a.txt", b"2\n").unwrap();
        add(&repo, "a.txt").unwrap();
        commit(&repo, &msg("c2")).unwrap();

        let c2 = refs::hash(&repo, "HEAD").unwrap().unwrap();
        let Some(Object::Commit { parents, .. }) = object::read(&repo, &c2).unwrap() else {
            panic!("expected commit");
        };
        assert_eq!(parents, vec![c1]);
    }

    #[test]
    fn test_nothing_to_commit() {
        let (_dir, repo) = test_repo();
        worktree::write_file(&repo, "a.txt", b"1\n").unwrap();
        add(&repo, "a.txt").unwrap();
        commit(&repo, &msg("c1")).unwrap();

        let err = commit(&repo, &msg("c2")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "# On master\nnothing to commit, working directory clean"
        );
    }

    #[test]
    fn test_commit_refused_with_unresolved_conflicts() {
        let (_dir, repo) = test_repo();
        worktree::write_file(&repo, "a.txt", b"1\n").unwrap();
        add(&repo, "a.txt").unwrap();
        commit(&repo, &msg("c1")).unwrap();
        let head = refs::hash(&repo, "HEAD").unwrap().unwrap();

        // fake an in-progress merge with a conflicted path
        refs::write(&repo, "MERGE_HEAD", &format!("{}\n", head.to_hex())).unwrap();
        let mut index = Index::load(&repo).unwrap();
        let h = worktree::blob_hash(b"x\n").unwrap();
        index.write_conflict("a.txt", Some(h), Some(h), Some(h));
        index.save(&repo).unwrap();

        let err = commit(&repo, &msg("c2")).unwrap_err();
        assert!(matches!(err, Error::UnresolvedConflicts(_)));
        assert!(err.to_string().contains("U a.txt"));
    }
}
