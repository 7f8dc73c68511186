//! push: advance a peer branch to the local branch head

use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph;
use crate::merge;
use crate::refs;
use crate::repo::Repo;

use super::local::{copy_to_peer, LocalPeer, TransferStats};
use super::Peer;

/// outcome of a push
#[derive(Debug)]
pub enum PushOutcome {
    AlreadyUpToDate,
    Pushed {
        url: String,
        branch: String,
        stats: TransferStats,
    },
}

impl fmt::Display for PushOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushOutcome::AlreadyUpToDate => write!(f, "Already up-to-date"),
            PushOutcome::Pushed { url, branch, stats } => write!(
                f,
                "To {}\nCount {}\n{} -> {}",
                url,
                stats.total(),
                branch,
                branch
            ),
        }
    }
}

/// push a branch to a configured remote
///
/// refuses to move a branch that is checked out on a non-bare peer, and
/// rejects non-fast-forward updates unless forced. objects are copied
/// before either side's refs move.
pub fn push(repo: &Repo, remote: &str, branch: &str, force: bool) -> Result<PushOutcome> {
    let url = repo
        .config()
        .remote_url(remote)
        .ok_or_else(|| Error::RemoteMissing(remote.to_string()))?
        .to_string();

    let peer = LocalPeer::open(&url)?;

    if peer.is_checked_out(branch)? {
        return Err(Error::CheckedOutBranch(branch.to_string()));
    }

    let receiver = peer.ref_hash(branch)?;
    let giver = refs::hash(repo, branch)?;

    if graph::is_up_to_date(repo, receiver.as_ref(), giver.as_ref())? {
        return Ok(PushOutcome::AlreadyUpToDate);
    }

    // is_up_to_date above is false whenever the giver is absent
    let Some(giver) = giver else {
        return Err(Error::UnknownRevision(branch.to_string()));
    };

    if !force && !merge::can_fast_forward(repo, receiver.as_ref(), &giver)? {
        return Err(Error::NonFastForward(url));
    }

    let stats = copy_to_peer(repo, &peer)?;
    debug!(remote, branch, copied = stats.copied, "pushed objects");

    peer.update_ref(&refs::local_ref(branch), &giver)?;
    refs::write(
        repo,
        &refs::remote_ref(remote, branch),
        &format!("{}\n", giver.to_hex()),
    )?;

    Ok(PushOutcome::Pushed {
        url,
        branch: branch.to_string(),
        stats,
    })
}
