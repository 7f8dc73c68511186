use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::object;
use crate::repo::Repo;

/// reserved single-token ref names
const RESERVED: [&str; 3] = ["HEAD", "FETCH_HEAD", "MERGE_HEAD"];

/// state of HEAD
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeadState {
    /// HEAD points at a local branch
    Attached(String),
    /// HEAD holds a raw commit hash
    Detached(Hash),
}

/// one line of the FETCH_HEAD record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchHeadRecord {
    pub hash: Hash,
    pub branch: String,
    pub url: String,
}

/// syntactic ref validation; total over all strings
pub fn is_ref(name: &str) -> bool {
    RESERVED.contains(&name)
        || parse_local_branch(name).is_some()
        || parse_remote_branch(name).is_some()
}

/// branch names are restricted to `[A-Za-z-]+`
fn branch_name_ok(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
}

fn parse_local_branch(name: &str) -> Option<&str> {
    name.strip_prefix("refs/heads/").filter(|b| branch_name_ok(b))
}

fn parse_remote_branch(name: &str) -> Option<(&str, &str)> {
    let rest = name.strip_prefix("refs/remotes/")?;
    let (remote, branch) = rest.split_once('/')?;
    (branch_name_ok(remote) && branch_name_ok(branch)).then_some((remote, branch))
}

/// qualified form of a local branch name
pub fn local_ref(branch: &str) -> String {
    format!("refs/heads/{branch}")
}

/// qualified form of a remote-tracking branch name
pub fn remote_ref(remote: &str, branch: &str) -> String {
    format!("refs/remotes/{remote}/{branch}")
}

fn ref_path(repo: &Repo, name: &str) -> PathBuf {
    repo.storage_path().join(name)
}

/// raw content of a ref record, if present
pub fn read(repo: &Repo, name: &str) -> Result<Option<String>> {
    let path = ref_path(repo, name);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Io { path, source: e }),
    }
}

/// write a ref record
///
/// a name that fails ref syntax is silently ignored (source contract; see
/// DESIGN.md).
pub fn write(repo: &Repo, name: &str, content: &str) -> Result<()> {
    if !is_ref(name) {
        return Ok(());
    }
    repo.atomic_write(&ref_path(repo, name), content.as_bytes())
}

/// remove a ref record; absence is fine
pub fn rm(repo: &Repo, name: &str) -> Result<()> {
    let path = ref_path(repo, name);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io { path, source: e }),
    }
}

/// does a record exist for this ref name
pub fn exists(repo: &Repo, name: &str) -> Result<bool> {
    Ok(is_ref(name) && ref_path(repo, name).is_file())
}

/// parse the HEAD record
pub fn head_state(repo: &Repo) -> Result<HeadState> {
    let content = read(repo, "HEAD")?.ok_or_else(|| Error::MalformedRef("HEAD".to_string()))?;
    let line = content.trim();

    if let Some(target) = line.strip_prefix("ref: ") {
        let branch = parse_local_branch(target)
            .ok_or_else(|| Error::MalformedRef(format!("HEAD -> {target}")))?;
        return Ok(HeadState::Attached(branch.to_string()));
    }

    let hash = Hash::from_hex(line).map_err(|_| Error::MalformedRef("HEAD".to_string()))?;
    Ok(HeadState::Detached(hash))
}

/// branch referenced by HEAD, or none when detached
pub fn head_branch_name(repo: &Repo) -> Result<Option<String>> {
    match head_state(repo)? {
        HeadState::Attached(branch) => Ok(Some(branch)),
        HeadState::Detached(_) => Ok(None),
    }
}

pub fn is_head_detached(repo: &Repo) -> Result<bool> {
    Ok(matches!(head_state(repo)?, HeadState::Detached(_)))
}

/// resolve symbolic layers to a terminal ref name
///
/// `HEAD` resolves to the attached branch ref (or stays `HEAD` when
/// detached); qualified names pass through; anything else is treated as an
/// unqualified local branch.
pub fn terminal_ref(repo: &Repo, name: &str) -> Result<String> {
    if name == "HEAD" {
        if let HeadState::Attached(branch) = head_state(repo)? {
            return Ok(local_ref(&branch));
        }
        return Ok("HEAD".to_string());
    }
    if is_ref(name) {
        return Ok(name.to_string());
    }
    Ok(local_ref(name))
}

/// resolve a ref name or raw hash to a commit hash
///
/// an argument that is an existing object hash resolves to itself;
/// `FETCH_HEAD` resolves through the record line for the current branch.
pub fn hash(repo: &Repo, name_or_hash: &str) -> Result<Option<Hash>> {
    if Hash::looks_like_hash(name_or_hash) {
        let h = Hash::from_hex(name_or_hash)?;
        if object::exists(repo, &h) {
            return Ok(Some(h));
        }
    }

    let terminal = terminal_ref(repo, name_or_hash)?;

    if terminal == "FETCH_HEAD" {
        return fetch_head_branch_hash(repo);
    }

    if terminal == "HEAD" {
        // only reachable when detached
        return match head_state(repo)? {
            HeadState::Detached(h) => Ok(Some(h)),
            HeadState::Attached(branch) => hash(repo, &local_ref(&branch)),
        };
    }

    match read(repo, &terminal)? {
        Some(content) => {
            let h = Hash::from_hex(content.trim())
                .map_err(|_| Error::MalformedRef(terminal))?;
            Ok(Some(h))
        }
        None => Ok(None),
    }
}

/// write the terminal form of a ref to a commit hash
pub fn update_terminal(repo: &Repo, name: &str, hash: &Hash) -> Result<()> {
    let terminal = terminal_ref(repo, name)?;
    write(repo, &terminal, &format!("{}\n", hash.to_hex()))
}

/// local branches and their commit hashes
pub fn local_heads(repo: &Repo) -> Result<BTreeMap<String, Hash>> {
    let dir = repo.refs_path().join("heads");
    let mut heads = BTreeMap::new();

    if !dir.exists() {
        return Ok(heads);
    }

    for entry in fs::read_dir(&dir).with_path(&dir)? {
        let entry = entry.with_path(&dir)?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if let Some(h) = hash(repo, &local_ref(&name))? {
            heads.insert(name, h);
        }
    }

    Ok(heads)
}

/// is this branch the one checked out in a non-bare repository
pub fn is_checked_out(repo: &Repo, branch: &str) -> Result<bool> {
    Ok(!repo.is_bare() && head_branch_name(repo)?.as_deref() == Some(branch))
}

/// is a merge currently in progress
pub fn is_merge_in_progress(repo: &Repo) -> Result<bool> {
    Ok(hash(repo, "MERGE_HEAD")?.is_some())
}

/// parents for the next commit
///
/// `[HEAD, MERGE_HEAD]` while a merge is in progress, empty before the
/// first commit, `[HEAD]` otherwise.
pub fn commit_parent_hashes(repo: &Repo) -> Result<Vec<Hash>> {
    let head = hash(repo, "HEAD")?;
    if let Some(merge_head) = hash(repo, "MERGE_HEAD")? {
        let head = head.ok_or_else(|| Error::MalformedRef("MERGE_HEAD".to_string()))?;
        return Ok(vec![head, merge_head]);
    }
    Ok(head.into_iter().collect())
}

/// parse the FETCH_HEAD record lines
fn parse_fetch_head(content: &str) -> Result<Vec<FetchHeadRecord>> {
    let mut records = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        let mut tokens = line.split_whitespace();
        let record = (|| {
            let hash = Hash::from_hex(tokens.next()?).ok()?;
            (tokens.next()? == "branch").then_some(())?;
            let branch = tokens.next()?.to_string();
            (tokens.next()? == "of").then_some(())?;
            let url = tokens.next()?.to_string();
            tokens.next().is_none().then_some(())?;
            Some(FetchHeadRecord { hash, branch, url })
        })()
        .ok_or_else(|| Error::MalformedRef(format!("FETCH_HEAD: {line}")))?;
        records.push(record);
    }
    Ok(records)
}

/// FETCH_HEAD hash recorded for the current branch, if any
fn fetch_head_branch_hash(repo: &Repo) -> Result<Option<Hash>> {
    let Some(branch) = head_branch_name(repo)? else {
        return Ok(None);
    };
    let Some(content) = read(repo, "FETCH_HEAD")? else {
        return Ok(None);
    };
    Ok(parse_fetch_head(&content)?
        .into_iter()
        .find(|r| r.branch == branch)
        .map(|r| r.hash))
}

/// record a fetched branch in FETCH_HEAD, replacing that branch's old line
pub fn write_fetch_head(repo: &Repo, branch: &str, hash: &Hash, url: &str) -> Result<()> {
    let mut records = match read(repo, "FETCH_HEAD")? {
        Some(content) => parse_fetch_head(&content)?,
        None => Vec::new(),
    };
    records.retain(|r| r.branch != branch);
    records.insert(
        0,
        FetchHeadRecord {
            hash: *hash,
            branch: branch.to_string(),
            url: url.to_string(),
        },
    );

    let body: String = records
        .iter()
        .map(|r| format!("{} branch {} of {}\n", r.hash.to_hex(), r.branch, r.url))
        .collect();
    write(repo, "FETCH_HEAD", &body)
}
