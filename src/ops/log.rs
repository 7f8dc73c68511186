use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{self, Object};
use crate::refs;
use crate::repo::Repo;

/// commit with its hash for log output
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub hash: Hash,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "commit {}", self.hash)?;
        writeln!(f)?;
        for line in self.message.lines() {
            writeln!(f, "    {line}")?;
        }
        Ok(())
    }
}

/// history of a revision, newest first, following parent links
pub fn log(repo: &Repo, ref_or_hash: &str) -> Result<Vec<LogEntry>> {
    let head = refs::hash(repo, ref_or_hash)?
        .ok_or_else(|| Error::UnknownRevision(ref_or_hash.to_string()))?;

    let mut entries = Vec::new();
    let mut visited = HashSet::new();
    let mut to_visit = vec![head];

    while let Some(hash) = to_visit.pop() {
        if !visited.insert(hash) {
            continue;
        }

        let Some(Object::Commit { parents, message, .. }) = object::read(repo, &hash)?
        else {
            continue;
        };

        // first parent last so it is visited next
        for parent in parents.iter().rev() {
            to_visit.push(*parent);
        }

        entries.push(LogEntry { hash, message });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::add::add;
    use crate::ops::commit::{commit, CommitOptions};
    use crate::worktree;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("repo"), false).unwrap();
        (dir, repo)
    }

    fn commit_file(repo: &Repo, content: &[u8], message: &str) {
        worktree::write_file(repo, "a.txt", content).unwrap();
        add(repo, "a.txt").unwrap();
        commit(
            repo,
            &CommitOptions {
                message: Some(message.to_string()),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_log_unknown_revision() {
        let (_dir, repo) = test_repo();
        assert!(matches!(
            log(&repo, "ghost"),
            Err(Error::UnknownRevision(_))
        ));
    }

    #[test]
    fn test_log_newest_first() {
        let (_dir, repo) = test_repo();
        commit_file(&repo, b"1\n", "c1");
        commit_file(&repo, b"2\n", "c2");
        commit_file(&repo, b"3\n", "c3");

        let entries = log(&repo, "master").unwrap();

        let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["c3", "c2", "c1"]);
    }

    #[test]
    fn test_log_entry_display() {
        let (_dir, repo) = test_repo();
        commit_file(&repo, b"1\n", "first commit");

        let entries = log(&repo, "HEAD").unwrap();
        let rendered = entries[0].to_string();

        assert!(rendered.starts_with(&format!("commit {}", entries[0].hash)));
        assert!(rendered.contains("    first commit"));
    }
}
