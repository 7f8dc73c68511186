use std::path::Path;

use crate::error::Result;
use crate::repo::Repo;

/// init options
#[derive(Clone, Copy, Debug, Default)]
pub struct InitOptions {
    pub bare: bool,
}

/// initialize a repository at the given path
///
/// a path that already holds a repository is reopened unchanged.
pub fn init(path: &Path, opts: InitOptions) -> Result<Repo> {
    Repo::init(path, opts.bare)
}
