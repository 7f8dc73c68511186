pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Hash;

pub use store::{
    all_hashes, commit_toc, exists, nest, read, toc_or_empty, tree_toc, write, write_commit,
    write_tree, Toc, TocNode,
};

/// the three object kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        };
        write!(f, "{s}")
    }
}

/// a stored object - closed sum of blob, tree and commit
///
/// the canonical serialization is the CBOR encoding of this tagged enum;
/// the object hash is SHA-256 over those bytes, so identical logical
/// content always lands on the same key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Object {
    Blob {
        data: Vec<u8>,
    },
    Tree {
        entries: Vec<TreeEntry>,
    },
    Commit {
        tree: Hash,
        parents: Vec<Hash>,
        message: String,
    },
}

impl Object {
    /// create a blob
    pub fn blob(data: impl Into<Vec<u8>>) -> Self {
        Object::Blob { data: data.into() }
    }

    /// create a tree, validating and sorting entries by name bytes
    pub fn tree(mut entries: Vec<TreeEntry>) -> Result<Self> {
        for entry in &entries {
            validate_entry_name(&entry.name)?;
        }

        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

        for window in entries.windows(2) {
            if window[0].name == window[1].name {
                return Err(Error::DuplicateEntryName(window[0].name.clone()));
            }
        }

        Ok(Object::Tree { entries })
    }

    /// create a commit
    pub fn commit(tree: Hash, parents: Vec<Hash>, message: impl Into<String>) -> Self {
        Object::Commit {
            tree,
            parents,
            message: message.into(),
        }
    }

    /// object kind tag
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Blob { .. } => ObjectKind::Blob,
            Object::Tree { .. } => ObjectKind::Tree,
            Object::Commit { .. } => ObjectKind::Commit,
        }
    }

    /// canonical byte encoding (CBOR of the tagged enum)
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::into_writer(self, &mut bytes)?;
        Ok(bytes)
    }

    /// decode a canonical byte record
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let object: Object = ciborium::from_reader(bytes)?;
        Ok(object)
    }

    /// content address this object would store under
    pub fn hash(&self) -> Result<Hash> {
        Ok(crate::hash::compute_hash(&self.canonical_bytes()?))
    }
}

/// a single entry in a tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// kind of tree entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    Blob { hash: Hash },
    Tree { hash: Hash },
}

impl EntryKind {
    pub fn hash(&self) -> Hash {
        match self {
            EntryKind::Blob { hash } | EntryKind::Tree { hash } => *hash,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryKind::Tree { .. })
    }
}

/// validate an entry name: a single non-empty path segment
fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidEntryName("empty name".to_string()));
    }
    if name.contains('/') {
        return Err(Error::InvalidEntryName(format!(
            "name contains '/': {name}"
        )));
    }
    if name.contains('\0') {
        return Err(Error::InvalidEntryName(format!(
            "name contains null byte: {name}"
        )));
    }
    if name == "." || name == ".." {
        return Err(Error::InvalidEntryName(format!("reserved name: {name}")));
    }
    Ok(())
}
