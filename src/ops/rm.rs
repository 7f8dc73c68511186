use crate::error::{Error, Result};
use crate::index::Index;
use crate::repo::Repo;
use crate::worktree;

use super::update_index::{update_index, UpdateIndexOptions};

/// rm options
#[derive(Clone, Copy, Debug, Default)]
pub struct RmOptions {
    /// `-f` is deliberately not implemented
    pub force: bool,
    /// required to remove a directory
    pub recursive: bool,
}

/// remove files from the index and the working copy
///
/// refuses targets whose working-copy content differs from their staged
/// entry.
pub fn rm(repo: &Repo, pathspec: &str, opts: RmOptions) -> Result<()> {
    repo.worktree()?;

    if opts.force {
        return Err(Error::Unsupported);
    }

    let index = Index::load(repo)?;
    let files = index.matching_files(pathspec);

    if files.is_empty() {
        return Err(Error::NoMatch(pathspec.to_string()));
    }

    if worktree::is_dir(repo, pathspec)? && !opts.recursive {
        return Err(Error::RecursiveRequired(pathspec.to_string()));
    }

    let changed: Vec<String> = worktree::added_or_modified_files(repo, &index)?
        .into_iter()
        .filter(|p| files.contains(p))
        .collect();
    if !changed.is_empty() {
        return Err(Error::FilesHaveChanges(changed));
    }

    for path in files {
        worktree::rm_file(repo, &path)?;
        update_index(
            repo,
            &path,
            UpdateIndexOptions {
                add: false,
                remove: true,
            },
        )?;
    }

    Ok(())
}
