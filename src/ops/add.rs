use crate::error::{Error, Result};
use crate::repo::Repo;
use crate::worktree;

use super::update_index::{update_index, UpdateIndexOptions};

/// stage every working-copy file under a pathspec
pub fn add(repo: &Repo, pathspec: &str) -> Result<()> {
    repo.worktree()?;

    let files = worktree::ls_recursive(repo, pathspec)?;
    if files.is_empty() {
        return Err(Error::NoMatch(pathspec.to_string()));
    }

    for path in files {
        update_index(
            repo,
            &path,
            UpdateIndexOptions {
                add: true,
                remove: false,
            },
        )?;
    }

    Ok(())
}
