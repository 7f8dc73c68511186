use crate::error::{Error, Result};
use crate::index::{Index, STAGE_0};
use crate::object::{self, Object};
use crate::repo::Repo;
use crate::worktree;

/// update-index options
#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateIndexOptions {
    pub add: bool,
    pub remove: bool,
}

/// stage or unstage a single path
///
/// the outcome is a case analysis over (on disk, in index, options); see
/// the tests for the full table.
pub fn update_index(repo: &Repo, path: &str, opts: UpdateIndexOptions) -> Result<()> {
    repo.worktree()?;
    let mut index = Index::load(repo)?;

    let on_disk = worktree::on_disk(repo, path)?;
    let in_index = index.has_file(path, STAGE_0) || index.is_file_in_conflict(path);

    if on_disk && worktree::is_dir(repo, path)? {
        return Err(Error::PathIsDirectory(path.to_string()));
    }

    if opts.remove && !on_disk {
        if index.is_file_in_conflict(path) {
            // unstaging one side of a conflict is deliberately not implemented
            return Err(Error::Unsupported);
        }
        if in_index {
            index.write_rm(path);
            index.save(repo)?;
        }
        return Ok(());
    }

    if !opts.remove && !on_disk {
        return Err(Error::RemoveOptionRequired(path.to_string()));
    }

    if !opts.add && !in_index {
        return Err(Error::AddOptionRequired(path.to_string()));
    }

    let Some(content) = worktree::read_file(repo, path)? else {
        return Err(Error::NoMatch(path.to_string()));
    };
    let hash = object::write(repo, &Object::blob(content))?;
    index.write_non_conflict(path, hash);
    index.save(repo)
}
