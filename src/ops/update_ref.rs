use crate::error::{Error, Result};
use crate::object::{self, Object};
use crate::refs;
use crate::repo::Repo;

/// point a ref at the commit another ref or hash resolves to
pub fn update_ref(repo: &Repo, ref_to_update: &str, ref_or_hash: &str) -> Result<()> {
    let hash = refs::hash(repo, ref_or_hash)?
        .ok_or_else(|| Error::InvalidObjectName(ref_or_hash.to_string()))?;

    if !refs::is_ref(ref_to_update) {
        return Err(Error::InvalidRefName(ref_to_update.to_string()));
    }

    if !matches!(object::read(repo, &hash)?, Some(Object::Commit { .. })) {
        return Err(Error::NotACommit {
            name: refs::terminal_ref(repo, ref_to_update)?,
            hash,
        });
    }

    refs::update_terminal(repo, ref_to_update, &hash)
}
