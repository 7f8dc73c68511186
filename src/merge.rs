use tracing::debug;

use crate::diff::{merge_diff, toc_diff, FileStatus};
use crate::error::{Error, Result};
use crate::graph;
use crate::hash::Hash;
use crate::index::Index;
use crate::object::{self, Object};
use crate::refs;
use crate::repo::Repo;
use crate::worktree;

/// can the receiver be advanced to the giver without a merge commit
///
/// trivially true before the first commit.
pub fn can_fast_forward(repo: &Repo, receiver: Option<&Hash>, giver: &Hash) -> Result<bool> {
    match receiver {
        None => Ok(true),
        Some(r) => graph::is_ancestor(repo, r, giver),
    }
}

/// would updating a ref from `old` to `new` discard history (reporting only)
pub fn is_a_force_fetch(repo: &Repo, old: Option<&Hash>, new: &Hash) -> Result<bool> {
    match old {
        None => Ok(false),
        Some(o) => Ok(!graph::is_ancestor(repo, o, new)?),
    }
}

/// advance the current branch to the giver
///
/// moves the terminal ref of HEAD, rewrites the index to the giver's toc and
/// (outside bare repositories) applies the receiver-to-giver diff to the
/// working copy.
pub fn write_fast_forward_merge(
    repo: &Repo,
    receiver: Option<&Hash>,
    giver: &Hash,
) -> Result<()> {
    debug!(giver = %giver, "fast-forward merge");

    refs::update_terminal(repo, "HEAD", giver)?;

    let giver_toc = object::commit_toc(repo, giver)?;
    let mut index = Index::load(repo)?;
    index.replace_with_toc(&giver_toc);
    index.save(repo)?;

    if !repo.is_bare() {
        let receiver_toc = object::toc_or_empty(repo, receiver)?;
        worktree::apply_diff(repo, &toc_diff(&receiver_toc, &giver_toc))?;
    }

    Ok(())
}

/// start a three-way merge of the giver into the receiver
///
/// records MERGE_HEAD and MERGE_MSG, then materializes the three-way diff:
/// resolved paths land in the working copy and stage 0; conflicted paths get
/// a conflict-marked file and stages 1/2/3. returns whether conflicts remain.
pub fn write_non_fast_forward_merge(
    repo: &Repo,
    receiver: &Hash,
    giver: &Hash,
    giver_label: &str,
) -> Result<bool> {
    refs::write(repo, "MERGE_HEAD", &format!("{}\n", giver.to_hex()))?;

    let head_desc = refs::head_branch_name(repo)?.unwrap_or_else(|| "HEAD".to_string());
    write_merge_msg(repo, &format!("Merge {giver_label} into {head_desc}\n"))?;

    let base = graph::common_ancestor(repo, receiver, giver)?;
    debug!(receiver = %receiver, giver = %giver, base = ?base, "three-way merge");

    let base_toc = object::toc_or_empty(repo, base.as_ref())?;
    let receiver_toc = object::commit_toc(repo, receiver)?;
    let giver_toc = object::commit_toc(repo, giver)?;
    let changes = merge_diff(&base_toc, &receiver_toc, &giver_toc);

    let mut index = Index::load(repo)?;
    let mut has_conflicts = false;

    for (path, change) in &changes {
        match change.status {
            FileStatus::Conflict => {
                has_conflicts = true;
                let ours = blob_data(repo, change.receiver.as_ref())?;
                let theirs = blob_data(repo, change.giver.as_ref())?;
                worktree::write_file(
                    repo,
                    path,
                    &compose_conflict(&ours, &theirs, giver_label),
                )?;
                index.write_conflict(path, change.base, change.receiver, change.giver);
            }
            FileStatus::Add | FileStatus::Modify => {
                let Some(hash) = change.resolved else { continue };
                worktree::write_file(repo, path, &blob_data(repo, Some(&hash))?)?;
                index.write_non_conflict(path, hash);
            }
            FileStatus::Delete => {
                worktree::rm_file(repo, path)?;
                index.write_rm(path);
            }
        }
    }

    index.save(repo)?;
    Ok(has_conflicts)
}

/// read the body of MERGE_MSG
pub fn read_merge_msg(repo: &Repo) -> Result<Option<String>> {
    let path = repo.storage_path().join("MERGE_MSG");
    match std::fs::read_to_string(&path) {
        Ok(msg) => Ok(Some(msg)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Io { path, source: e }),
    }
}

fn write_merge_msg(repo: &Repo, message: &str) -> Result<()> {
    repo.atomic_write(&repo.storage_path().join("MERGE_MSG"), message.as_bytes())
}

/// remove the transient merge state after the closing commit
pub fn clear_merge_state(repo: &Repo) -> Result<()> {
    refs::rm(repo, "MERGE_HEAD")?;
    let path = repo.storage_path().join("MERGE_MSG");
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io { path, source: e }),
    }
}

fn blob_data(repo: &Repo, hash: Option<&Hash>) -> Result<Vec<u8>> {
    let Some(hash) = hash else {
        return Ok(Vec::new());
    };
    match object::read(repo, hash)? {
        Some(Object::Blob { data }) => Ok(data),
        _ => Err(Error::CorruptObject(*hash)),
    }
}

/// conflict-marked composite of both sides
fn compose_conflict(ours: &[u8], theirs: &[u8], giver_label: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"<<<<<<< HEAD\n");
    out.extend_from_slice(ours);
    out.extend_from_slice(b"=======\n");
    out.extend_from_slice(theirs);
    out.extend_from_slice(format!(">>>>>>> {giver_label}\n").as_bytes());
    out
}
