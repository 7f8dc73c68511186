//! sync engine: fetch, push and clone over an abstract peer

pub mod clone;
pub mod fetch;
pub mod local;
pub mod push;

pub use clone::{clone, CloneOptions};
pub use fetch::{fetch, FetchResult};
pub use local::{LocalPeer, TransferStats};
pub use push::{push, PushOutcome};

use std::collections::BTreeSet;

use crate::error::Result;
use crate::hash::Hash;
use crate::object::Object;

/// handle onto another repository
///
/// the sync engine only ever talks to a peer through this interface:
/// read-only ref and object queries, idempotent object writes, and ref
/// updates. any transport satisfying it works; this crate ships a
/// same-machine [`LocalPeer`].
pub trait Peer {
    /// the peer's url as configured
    fn url(&self) -> &str;

    /// resolve a ref name in the peer repository
    fn ref_hash(&self, name: &str) -> Result<Option<Hash>>;

    /// every object hash the peer stores
    fn all_object_hashes(&self) -> Result<BTreeSet<Hash>>;

    /// read one peer object
    fn read_object(&self, hash: &Hash) -> Result<Option<Object>>;

    /// write one object into the peer store
    fn write_object(&self, object: &Object) -> Result<Hash>;

    /// is the branch checked out in a non-bare peer
    fn is_checked_out(&self, branch: &str) -> Result<bool>;

    /// update a peer ref to a commit hash (full update-ref semantics)
    fn update_ref(&self, name: &str, hash: &Hash) -> Result<()>;
}
