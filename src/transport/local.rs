//! same-machine peer backed by a second repository handle

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::Result;
use crate::hash::Hash;
use crate::object::{self, Object};
use crate::ops;
use crate::refs;
use crate::repo::Repo;

use super::Peer;

/// a peer rooted at a local filesystem path
pub struct LocalPeer {
    url: String,
    repo: Repo,
}

impl LocalPeer {
    /// open the repository at the given path as a peer
    pub fn open(url: &str) -> Result<Self> {
        let repo = Repo::open(Path::new(url))?;
        Ok(Self {
            url: url.to_string(),
            repo,
        })
    }
}

impl Peer for LocalPeer {
    fn url(&self) -> &str {
        &self.url
    }

    fn ref_hash(&self, name: &str) -> Result<Option<Hash>> {
        refs::hash(&self.repo, name)
    }

    fn all_object_hashes(&self) -> Result<BTreeSet<Hash>> {
        object::all_hashes(&self.repo)
    }

    fn read_object(&self, hash: &Hash) -> Result<Option<Object>> {
        object::read(&self.repo, hash)
    }

    fn write_object(&self, object: &Object) -> Result<Hash> {
        object::write(&self.repo, object)
    }

    fn is_checked_out(&self, branch: &str) -> Result<bool> {
        refs::is_checked_out(&self.repo, branch)
    }

    fn update_ref(&self, name: &str, hash: &Hash) -> Result<()> {
        ops::update_ref(&self.repo, name, &hash.to_hex())?;
        Ok(())
    }
}

/// per-transfer object statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub copied: usize,
    pub skipped: usize,
}

impl TransferStats {
    pub fn total(&self) -> usize {
        self.copied + self.skipped
    }
}

/// copy every peer object into the local store
///
/// idempotent by content addressing: objects already present are skipped.
pub(super) fn copy_from_peer(repo: &Repo, peer: &dyn Peer) -> Result<TransferStats> {
    let mut stats = TransferStats::default();

    for hash in peer.all_object_hashes()? {
        if object::exists(repo, &hash) {
            stats.skipped += 1;
            continue;
        }
        if let Some(obj) = peer.read_object(&hash)? {
            object::write(repo, &obj)?;
            stats.copied += 1;
        }
    }

    Ok(stats)
}

/// copy every local object into the peer store
pub(super) fn copy_to_peer(repo: &Repo, peer: &dyn Peer) -> Result<TransferStats> {
    let mut stats = TransferStats::default();
    let peer_hashes = peer.all_object_hashes()?;

    for hash in object::all_hashes(repo)? {
        if peer_hashes.contains(&hash) {
            stats.skipped += 1;
            continue;
        }
        if let Some(obj) = object::read(repo, &hash)? {
            peer.write_object(&obj)?;
            stats.copied += 1;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn repo_at(dir: &Path, name: &str) -> Repo {
        Repo::init(&dir.join(name), false).unwrap()
    }

    #[test]
    fn test_open_non_repo_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain");
        std::fs::create_dir(&path).unwrap();

        assert!(LocalPeer::open(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_copy_objects_both_ways() {
        let dir = tempdir().unwrap();
        let src = repo_at(dir.path(), "src");
        let dst = repo_at(dir.path(), "dst");

        let h = object::write(&src, &Object::blob(b"payload".to_vec())).unwrap();

        let peer = LocalPeer::open(dir.path().join("src").to_str().unwrap()).unwrap();
        let stats = copy_from_peer(&dst, &peer).unwrap();

        assert_eq!(stats.copied, 1);
        assert!(object::exists(&dst, &h));

        // a second copy is a pure skip
        let stats = copy_from_peer(&dst, &peer).unwrap();
        assert_eq!(stats.copied, 0);
        assert_eq!(stats.skipped, 1);

        let h2 = object::write(&dst, &Object::blob(b"reply".to_vec())).unwrap();
        let stats = copy_to_peer(&dst, &peer).unwrap();
        assert_eq!(stats.copied, 1);
        assert!(object::exists(&src, &h2));
    }
}
