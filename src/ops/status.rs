use crate::diff::{name_status, toc_diff};
use crate::error::Result;
use crate::index::Index;
use crate::object;
use crate::refs;
use crate::repo::Repo;
use crate::worktree;

/// working-copy status report
///
/// shows the current branch, untracked files, unmerged paths, staged
/// changes against HEAD, and unstaged changes against the index.
pub fn status(repo: &Repo) -> Result<String> {
    repo.worktree()?;

    let index = Index::load(repo)?;

    let headline = match refs::head_branch_name(repo)? {
        Some(branch) => format!("On branch {branch}"),
        None => "On detached HEAD".to_string(),
    };

    let untracked = worktree::untracked_files(repo, &index)?;
    let unmerged = index.conflicted_paths();

    let head_hash = refs::hash(repo, "HEAD")?;
    let head_toc = object::toc_or_empty(repo, head_hash.as_ref())?;
    let index_toc = index.toc();
    let to_be_committed = name_status(&toc_diff(&head_toc, &index_toc));

    let index_paths: Vec<String> = index_toc.keys().cloned().collect();
    let wc_toc = worktree::working_copy_toc(repo, index_paths.iter())?;
    let not_staged = name_status(&toc_diff(&index_toc, &wc_toc));

    let mut sections = vec![headline];
    push_listing(&mut sections, "Untracked files:", &untracked.join("\n"));
    push_listing(&mut sections, "Unmerged paths:", &unmerged.join("\n"));
    push_listing(&mut sections, "Changes to be committed:", &to_be_committed);
    push_listing(&mut sections, "Changes not staged for commit:", &not_staged);

    Ok(sections.join("\n"))
}

fn push_listing(sections: &mut Vec<String>, heading: &str, body: &str) {
    if !body.is_empty() {
        sections.push(format!("{heading}\n{body}"));
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

    #[test]
    fn test_status_clean_repo() {
        let (_dir, repo) = test_repo();
        assert_eq!(status(&repo).unwrap(), "On branch master");
    }

    #[test]
    fn test_status_untracked() {
        let (_dir, repo) = test_repo();
        worktree::write_file(&repo, "loose.txt", b"1\n").unwrap();

        assert_eq!(
            status(&repo).unwrap(),
            "On branch master\nUntracked files:\nloose.txt"
        );
    }

    #[test]
    fn test_status_staged_and_unstaged() {
        let (_dir, repo) = test_repo();
        worktree::write_file(&repo, "a.txt", b"1\n").unwrap();
        add(&repo, "a.txt").unwrap();
        commit(
            &repo,
            &CommitOptions {
                message: Some("c1".to_string()),
            },
        )
        .unwrap();

        // staged addition
        worktree::write_file(&repo, "b.txt", b"2\n").unwrap();
        add(&repo, "b.txt").unwrap();
        // unstaged modification
        worktree::write_file(&repo, "a.txt", b"edited\n").unwrap();

        let report = status(&repo).unwrap();
        assert!(report.contains("Changes to be committed:\nA b.txt"));
        assert!(report.contains("Changes not staged for commit:\nM a.txt"));
    }

    #[test]
    fn test_status_unmerged_paths() {
        let (_dir, repo) = test_repo();
        let mut index = Index::load(&repo).unwrap();
        let h = worktree::blob_hash(b"x\n").unwrap();
        index.write_conflict("a.txt", Some(h), Some(h), Some(h));
        index.save(&repo).unwrap();
        worktree::write_file(&repo, "a.txt", b"x\n").unwrap();

        let report = status(&repo).unwrap();
        assert!(report.contains("Unmerged paths:\na.txt"));
    }
}
