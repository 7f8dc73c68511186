use crate::error::{Error, Result};
use crate::repo::Repo;

/// record a remote in the configuration; only `add` is supported
pub fn remote(repo: &mut Repo, command: &str, name: &str, url: &str) -> Result<String> {
    if command != "add" {
        return Err(Error::Unsupported);
    }

    repo.config_mut().add_remote(name, url)?;
    repo.save_config()?;
    Ok(String::new())
}
