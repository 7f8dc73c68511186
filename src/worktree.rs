use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::diff::{toc_diff, Change, FileStatus};
use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::index::Index;
use crate::object::{self, Object, Toc};
use crate::refs;
use crate::repo::{Repo, STORAGE_DIR};

/// hash the given bytes would store under as a blob
pub fn blob_hash(content: &[u8]) -> Result<Hash> {
    Object::blob(content.to_vec()).hash()
}

fn abs_path(repo: &Repo, path: &str) -> Result<PathBuf> {
    Ok(repo.worktree()?.join(path))
}

/// read a working-copy file; absence is a normal outcome
pub fn read_file(repo: &Repo, path: &str) -> Result<Option<Vec<u8>>> {
    let abs = abs_path(repo, path)?;
    match fs::read(&abs) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Io {
            path: abs,
            source: e,
        }),
    }
}

/// write a working-copy file, creating parent directories
pub fn write_file(repo: &Repo, path: &str, content: &[u8]) -> Result<()> {
    let abs = abs_path(repo, path)?;
    if let Some(parent) = abs.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }
    fs::write(&abs, content).with_path(&abs)
}

/// remove a working-copy file and prune directories it leaves empty
pub fn rm_file(repo: &Repo, path: &str) -> Result<()> {
    let abs = abs_path(repo, path)?;
    match fs::remove_file(&abs) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(Error::Io {
                path: abs,
                source: e,
            })
        }
    }

    let root = repo.worktree()?;
    let mut dir = abs.parent().map(PathBuf::from);
    while let Some(d) = dir {
        if d == root || fs::remove_dir(&d).is_err() {
            break;
        }
        dir = d.parent().map(PathBuf::from);
    }

    Ok(())
}

/// is the path a working-copy directory
pub fn is_dir(repo: &Repo, path: &str) -> Result<bool> {
    Ok(abs_path(repo, path)?.is_dir())
}

/// does the path exist in the working copy
pub fn on_disk(repo: &Repo, path: &str) -> Result<bool> {
    Ok(abs_path(repo, path)?.exists())
}

/// list working-copy files under a pathspec (file or directory), repo-root
/// relative with `/` separators, sorted; the storage directory is skipped
pub fn ls_recursive(repo: &Repo, pathspec: &str) -> Result<Vec<String>> {
    let root = repo.worktree()?;
    let base = if pathspec.is_empty() {
        root.to_path_buf()
    } else {
        root.join(pathspec)
    };

    if !base.exists() {
        return Ok(Vec::new());
    }
    if base.is_file() {
        return Ok(vec![pathspec.to_string()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&base)
        .into_iter()
        .filter_entry(|e| e.file_name().to_str() != Some(STORAGE_DIR))
    {
        let entry = entry.map_err(|e| Error::Io {
            path: base.clone(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "walkdir error")
                }),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if let Ok(rel) = entry.path().strip_prefix(root) {
            let path = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// toc of the working copy restricted to the given paths; files missing
/// from disk have no entry
pub fn working_copy_toc<'a>(
    repo: &Repo,
    paths: impl IntoIterator<Item = &'a String>,
) -> Result<Toc> {
    let mut toc = Toc::new();
    for path in paths {
        if let Some(content) = read_file(repo, path)? {
            toc.insert(path.clone(), blob_hash(&content)?);
        }
    }
    Ok(toc)
}

/// apply a semantic diff to the working copy
pub fn apply_diff(repo: &Repo, changes: &BTreeMap<String, Change>) -> Result<()> {
    for (path, change) in changes {
        match change.status {
            FileStatus::Add | FileStatus::Modify => {
                // add/modify entries always carry their right-side hash
                let Some(hash) = change.right else { continue };
                let Some(Object::Blob { data }) = object::read(repo, &hash)? else {
                    return Err(Error::CorruptObject(hash));
                };
                write_file(repo, path, &data)?;
            }
            FileStatus::Delete => rm_file(repo, path)?,
            FileStatus::Conflict => {}
        }
    }
    Ok(())
}

/// index paths whose working-copy content differs from their stage-0 entry
pub fn added_or_modified_files(repo: &Repo, index: &Index) -> Result<Vec<String>> {
    let mut changed = Vec::new();
    for (path, staged) in index.toc() {
        if let Some(content) = read_file(repo, &path)? {
            if blob_hash(&content)? != staged {
                changed.push(path);
            }
        }
    }
    Ok(changed)
}

/// paths a checkout or merge to `to_hash` would clobber: files that differ
/// between HEAD and the target while also carrying local changes
pub fn changed_files_commit_would_overwrite(
    repo: &Repo,
    index: &Index,
    to_hash: &Hash,
) -> Result<Vec<String>> {
    let head = refs::hash(repo, "HEAD")?;
    let head_toc = object::toc_or_empty(repo, head.as_ref())?;

    let index_paths = index.tracked_paths();
    let local = toc_diff(&head_toc, &working_copy_toc(repo, index_paths.iter())?);
    let target = toc_diff(&head_toc, &object::commit_toc(repo, to_hash)?);

    let local_paths: BTreeSet<&String> = local.keys().collect();
    Ok(target
        .keys()
        .filter(|p| local_paths.contains(p))
        .cloned()
        .collect())
}

/// working-copy files not present in the index at any stage
pub fn untracked_files(repo: &Repo, index: &Index) -> Result<Vec<String>> {
    let tracked: BTreeSet<String> = index.tracked_paths().into_iter().collect();
    Ok(ls_recursive(repo, "")?
        .into_iter()
        .filter(|p| !tracked.contains(p))
        .collect())
}
