use crate::error::{Error, Result};
use crate::graph;
use crate::index::Index;
use crate::merge::{
    can_fast_forward, write_fast_forward_merge, write_non_fast_forward_merge,
};
use crate::object::{self, Object};
use crate::refs;
use crate::repo::Repo;
use crate::worktree;

use super::commit::{commit, CommitOptions};

/// merge another revision into the current branch
///
/// returns "Already up-to-date", "Fast-forward", the merge commit report, or
/// the conflict notice; merging into a detached HEAD is not supported.
pub fn merge(repo: &Repo, ref_or_hash: &str) -> Result<String> {
    repo.worktree()?;

    let receiver = refs::hash(repo, "HEAD")?;
    let giver = refs::hash(repo, ref_or_hash)?;

    if refs::is_head_detached(repo)? {
        return Err(Error::Unsupported);
    }

    let giver = match giver {
        Some(h) if matches!(object::read(repo, &h)?, Some(Object::Commit { .. })) => h,
        _ => return Err(Error::ExpectedCommit(ref_or_hash.to_string())),
    };

    if graph::is_up_to_date(repo, receiver.as_ref(), Some(&giver))? {
        return Ok("Already up-to-date".to_string());
    }

    let index = Index::load(repo)?;
    let overwritten = worktree::changed_files_commit_would_overwrite(repo, &index, &giver)?;
    if !overwritten.is_empty() {
        return Err(Error::LocalChangesWouldBeLost(overwritten));
    }

    if can_fast_forward(repo, receiver.as_ref(), &giver)? {
        write_fast_forward_merge(repo, receiver.as_ref(), &giver)?;
        return Ok("Fast-forward".to_string());
    }

    // a merge that cannot fast-forward always has a receiver
    let Some(receiver) = receiver else {
        return Err(Error::ExpectedCommit("HEAD".to_string()));
    };

    let has_conflicts =
        write_non_fast_forward_merge(repo, &receiver, &giver, ref_or_hash)?;
    if has_conflicts {
        return Ok("Automatic merge failed. Fix conflicts and commit the result.".to_string());
    }

    commit(repo, &CommitOptions::default())
}
