use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::{compute_hash, Hash};
use crate::repo::Repo;

use super::{EntryKind, Object, TreeEntry};

/// flat table of contents: path -> blob hash
pub type Toc = BTreeMap<String, Hash>;

/// defensive bound on tree nesting; content addressing rules out cycles but
/// a crafted store could still chain trees indefinitely
const MAX_TREE_DEPTH: usize = 256;

/// filesystem path of an object record
fn object_path(repo: &Repo, hash: &Hash) -> PathBuf {
    repo.objects_path().join(hash.to_hex())
}

/// write an object, returning its content address
///
/// idempotent: an object that is already present is not rewritten.
pub fn write(repo: &Repo, object: &Object) -> Result<Hash> {
    let bytes = object.canonical_bytes()?;
    let hash = compute_hash(&bytes);

    let path = object_path(repo, &hash);
    if path.exists() {
        return Ok(hash);
    }

    repo.atomic_write(&path, &bytes)?;
    Ok(hash)
}

/// read an object; absence is a normal outcome
pub fn read(repo: &Repo, hash: &Hash) -> Result<Option<Object>> {
    let path = object_path(repo, hash);

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::Io {
                path,
                source: e,
            })
        }
    };

    if compute_hash(&bytes) != *hash {
        return Err(Error::CorruptObject(*hash));
    }

    let object = Object::decode(&bytes).map_err(|_| Error::CorruptObject(*hash))?;
    Ok(Some(object))
}

/// check if an object exists
pub fn exists(repo: &Repo, hash: &Hash) -> bool {
    object_path(repo, hash).exists()
}

/// enumerate every stored object hash
pub fn all_hashes(repo: &Repo) -> Result<BTreeSet<Hash>> {
    let dir = repo.objects_path();
    let mut hashes = BTreeSet::new();

    if !dir.exists() {
        return Ok(hashes);
    }

    for entry in fs::read_dir(&dir).with_path(&dir)? {
        let entry = entry.with_path(&dir)?;
        if !entry.file_type().with_path(&dir)?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if let Ok(hash) = Hash::from_hex(name) {
                hashes.insert(hash);
            }
        }
    }

    Ok(hashes)
}

/// node of a nested table of contents, the input shape of [`write_tree`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TocNode {
    Blob(Hash),
    Dir(BTreeMap<String, TocNode>),
}

/// nest a flat toc into per-segment directory levels
pub fn nest(flat: &Toc) -> BTreeMap<String, TocNode> {
    let mut root = BTreeMap::new();

    for (path, hash) in flat {
        let mut level = &mut root;
        let segments: Vec<&str> = path.split('/').collect();

        for segment in &segments[..segments.len() - 1] {
            let node = level
                .entry(segment.to_string())
                .or_insert_with(|| TocNode::Dir(BTreeMap::new()));
            // a blob and a directory under the same name cannot both come
            // out of a valid index; last writer wins
            if let TocNode::Blob(_) = *node {
                *node = TocNode::Dir(BTreeMap::new());
            }
            level = match node {
                TocNode::Dir(children) => children,
                TocNode::Blob(_) => unreachable!(),
            };
        }

        level.insert(
            segments[segments.len() - 1].to_string(),
            TocNode::Blob(*hash),
        );
    }

    root
}

/// recursively write a nested toc as tree objects, returning the root hash
pub fn write_tree(repo: &Repo, nested: &BTreeMap<String, TocNode>) -> Result<Hash> {
    write_tree_at(repo, nested, 0)
}

fn write_tree_at(
    repo: &Repo,
    nested: &BTreeMap<String, TocNode>,
    depth: usize,
) -> Result<Hash> {
    if depth > MAX_TREE_DEPTH {
        return Err(Error::TreeDepthExceeded);
    }

    let mut entries = Vec::new();
    for (name, node) in nested {
        let kind = match node {
            TocNode::Blob(hash) => EntryKind::Blob { hash: *hash },
            TocNode::Dir(children) => EntryKind::Tree {
                hash: write_tree_at(repo, children, depth + 1)?,
            },
        };
        entries.push(TreeEntry::new(name.clone(), kind));
    }

    write(repo, &Object::tree(entries)?)
}

/// write a commit object
///
/// parent order is preserved; on merges the receiver comes first.
pub fn write_commit(
    repo: &Repo,
    tree_hash: Hash,
    message: &str,
    parents: Vec<Hash>,
) -> Result<Hash> {
    write(repo, &Object::commit(tree_hash, parents, message))
}

/// flat toc of the tree referenced by a commit
pub fn commit_toc(repo: &Repo, commit_hash: &Hash) -> Result<Toc> {
    match read(repo, commit_hash)? {
        Some(Object::Commit { tree, .. }) => tree_toc(repo, &tree),
        _ => Err(Error::UnknownRevision(commit_hash.to_hex())),
    }
}

/// flat toc of a tree, walking nested trees
pub fn tree_toc(repo: &Repo, tree_hash: &Hash) -> Result<Toc> {
    let mut toc = Toc::new();
    flatten_tree(repo, tree_hash, "", &mut toc, 0)?;
    Ok(toc)
}

fn flatten_tree(
    repo: &Repo,
    tree_hash: &Hash,
    prefix: &str,
    toc: &mut Toc,
    depth: usize,
) -> Result<()> {
    if depth > MAX_TREE_DEPTH {
        return Err(Error::TreeDepthExceeded);
    }

    let Some(Object::Tree { entries }) = read(repo, tree_hash)? else {
        return Err(Error::UnknownRevision(tree_hash.to_hex()));
    };

    for entry in entries {
        let path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{}/{}", prefix, entry.name)
        };

        match entry.kind {
            EntryKind::Blob { hash } => {
                toc.insert(path, hash);
            }
            EntryKind::Tree { hash } => {
                flatten_tree(repo, &hash, &path, toc, depth + 1)?;
            }
        }
    }

    Ok(())
}

/// toc of an optional commit; none means the empty toc
pub fn toc_or_empty(repo: &Repo, commit_hash: Option<&Hash>) -> Result<Toc> {
    match commit_hash {
        Some(hash) => commit_toc(repo, hash),
        None => Ok(Toc::new()),
    }
}
