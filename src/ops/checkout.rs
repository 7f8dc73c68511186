use crate::diff::toc_diff;
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::Index;
use crate::object::{self, Object};
use crate::refs::{self, HeadState};
use crate::repo::Repo;
use crate::worktree;

/// switch the working copy, index and HEAD to another commit
///
/// checking out a raw hash detaches HEAD; checking out a branch name
/// attaches it.
pub fn checkout(repo: &Repo, ref_or_hash: &str) -> Result<String> {
    repo.worktree()?;

    let to_hash = refs::hash(repo, ref_or_hash)?
        .ok_or_else(|| Error::PathspecUnknown(ref_or_hash.to_string()))?;

    if !matches!(object::read(repo, &to_hash)?, Some(Object::Commit { .. })) {
        return Err(Error::ReferenceNotTree(ref_or_hash.to_string()));
    }

    if already_on(repo, ref_or_hash, &to_hash)? {
        return Ok(format!("Already on {ref_or_hash}"));
    }

    let mut index = Index::load(repo)?;
    let overwritten = worktree::changed_files_commit_would_overwrite(repo, &index, &to_hash)?;
    if !overwritten.is_empty() {
        return Err(Error::LocalChangesWouldBeLost(overwritten));
    }

    let head_hash = refs::hash(repo, "HEAD")?;
    let head_toc = object::toc_or_empty(repo, head_hash.as_ref())?;
    let to_toc = object::commit_toc(repo, &to_hash)?;
    worktree::apply_diff(repo, &toc_diff(&head_toc, &to_toc))?;

    // a bare hash argument detaches; a branch name attaches
    let detaching = Hash::looks_like_hash(ref_or_hash);
    if detaching {
        refs::write(repo, "HEAD", &format!("{}\n", to_hash.to_hex()))?;
    } else {
        refs::write(repo, "HEAD", &format!("ref: {}\n", refs::local_ref(ref_or_hash)))?;
    }

    index.replace_with_toc(&to_toc);
    index.save(repo)?;

    if detaching {
        Ok(format!(
            "Note: checking out {ref_or_hash}\nYou are in detached HEAD state."
        ))
    } else {
        Ok(format!("Switched to branch {ref_or_hash}"))
    }
}

fn already_on(repo: &Repo, ref_or_hash: &str, to_hash: &Hash) -> Result<bool> {
    match refs::head_state(repo)? {
        HeadState::Attached(branch) => Ok(branch == ref_or_hash),
        HeadState::Detached(h) => {
            Ok(h == *to_hash && Hash::looks_like_hash(ref_or_hash))
        }
    }
}
