//! fetch: mirror a peer branch into the remote-tracking namespace

use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::merge;
use crate::refs;
use crate::repo::Repo;

use super::local::{copy_from_peer, LocalPeer, TransferStats};
use super::Peer;

/// outcome of a fetch
#[derive(Debug)]
pub struct FetchResult {
    pub remote: String,
    pub branch: String,
    pub url: String,
    pub new_hash: Hash,
    pub stats: TransferStats,
    /// the remote-tracking ref moved to a non-descendant
    pub forced: bool,
}

impl fmt::Display for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "From {}\nCount {}\n{} -> {}/{}{}",
            self.url,
            self.stats.total(),
            self.branch,
            self.remote,
            self.branch,
            if self.forced { " (forced)" } else { "" }
        )
    }
}

/// fetch a branch from a configured remote
///
/// copies every peer object into the local store (idempotent), advances the
/// remote-tracking ref and records the result in FETCH_HEAD.
pub fn fetch(repo: &Repo, remote: &str, branch: &str) -> Result<FetchResult> {
    let url = repo
        .config()
        .remote_url(remote)
        .ok_or_else(|| Error::RemoteMissing(remote.to_string()))?
        .to_string();

    let peer = LocalPeer::open(&url)?;

    let new_hash = peer
        .ref_hash(branch)?
        .ok_or_else(|| Error::RemoteRefMissing(branch.to_string()))?;

    let tracking_ref = refs::remote_ref(remote, branch);
    let old_hash = refs::hash(repo, &tracking_ref)?;

    let stats = copy_from_peer(repo, &peer)?;
    debug!(remote, branch, copied = stats.copied, skipped = stats.skipped, "fetched objects");

    let forced = merge::is_a_force_fetch(repo, old_hash.as_ref(), &new_hash)?;

    refs::write(repo, &tracking_ref, &format!("{}\n", new_hash.to_hex()))?;
    refs::write_fetch_head(repo, branch, &new_hash, &url)?;

    Ok(FetchResult {
        remote: remote.to_string(),
        branch: branch.to_string(),
        url,
        new_hash,
        stats,
        forced,
    })
}
