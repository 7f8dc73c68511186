//! vers - minimal distributed version control
//!
//! a content-addressed object store layered with a staging index, a ref
//! namespace and a commit graph, supporting branches, three-way merge and
//! fetch/push/clone against same-machine peers.
//!
//! # Core concepts
//!
//! - **Blob**: content-addressed file bytes
//! - **Tree**: a directory level mapping names to blobs and subtrees
//! - **Commit**: a tree snapshot with parent links and a message
//! - **Ref**: a named pointer to a commit (`refs/heads/...`, HEAD, ...)
//! - **Index**: the staging table, including conflict stages 1/2/3
//!
//! objects are stored under the SHA-256 of their canonical CBOR bytes, so
//! identical content deduplicates and transfers are idempotent.
//!
//! # Example usage
//!
//! ```no_run
//! use std::path::Path;
//! use vers::{ops, Repo};
//!
//! let repo = Repo::init(Path::new("/path/to/work"), false).unwrap();
//! ops::add(&repo, "src").unwrap();
//! let report = ops::commit(
//!     &repo,
//!     &ops::CommitOptions { message: Some("initial".to_string()) },
//! )
//! .unwrap();
//! println!("{report}");
//! ```

mod config;
mod error;
mod hash;
mod repo;

pub mod diff;
pub mod graph;
pub mod index;
pub mod merge;
pub mod object;
pub mod ops;
pub mod refs;
pub mod transport;
pub mod worktree;

pub use config::{Config, Remote};
pub use error::{Error, Result};
pub use hash::{compute_hash, Hash};
pub use index::Index;
pub use object::{EntryKind, Object, ObjectKind, Toc, TreeEntry};
pub use repo::{Repo, STORAGE_DIR};
