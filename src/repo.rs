use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};

/// name of the storage directory inside a non-bare repository root
pub const STORAGE_DIR: &str = ".version";

/// a repository handle
///
/// carries the working-tree root (absent for bare repositories), the storage
/// directory holding objects/refs/index/config, and the parsed config. all
/// core operations take this handle; nothing consults the ambient working
/// directory.
pub struct Repo {
    worktree: Option<PathBuf>,
    storage: PathBuf,
    config: Config,
}

impl Repo {
    /// initialize a new repository at the given path
    ///
    /// for non-bare repositories the storage subtree lands in
    /// `<path>/.version`; for bare ones it sits at `<path>` directly.
    /// initializing where a repository already exists reopens it.
    pub fn init(path: &Path, bare: bool) -> Result<Self> {
        if let Ok(repo) = Self::open(path) {
            return Ok(repo);
        }

        let storage = if bare {
            path.to_path_buf()
        } else {
            path.join(STORAGE_DIR)
        };

        fs::create_dir_all(storage.join("objects")).with_path(&storage)?;
        fs::create_dir_all(storage.join("refs/heads")).with_path(&storage)?;
        fs::create_dir_all(storage.join("refs/remotes")).with_path(&storage)?;
        fs::create_dir_all(storage.join("tmp")).with_path(&storage)?;

        fs::write(storage.join("HEAD"), "ref: refs/heads/master\n")
            .with_path(storage.join("HEAD"))?;

        let config = Config::new(bare);
        config.save(&storage.join("config"))?;

        Ok(Self {
            worktree: (!bare).then(|| path.to_path_buf()),
            storage,
            config,
        })
    }

    /// open an existing repository rooted at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let nested = path.join(STORAGE_DIR);
        let storage = if nested.join("config").is_file() {
            nested
        } else if path.join("config").is_file() && path.join("HEAD").is_file() {
            path.to_path_buf()
        } else {
            return Err(Error::NotInRepo(path.to_path_buf()));
        };

        let config = Config::load(&storage.join("config"))?;
        let bare = config.core.bare;

        Ok(Self {
            worktree: (!bare).then(|| path.to_path_buf()),
            storage,
            config,
        })
    }

    /// locate a repository by walking parent directories from `start`
    pub fn find(start: &Path) -> Result<Self> {
        let mut dir = Some(start.to_path_buf());
        while let Some(d) = dir {
            match Self::open(&d) {
                Ok(repo) => return Ok(repo),
                Err(Error::NotInRepo(_)) => dir = d.parent().map(Path::to_path_buf),
                Err(e) => return Err(e),
            }
        }
        Err(Error::NotInRepo(start.to_path_buf()))
    }

    /// is this a bare repository
    pub fn is_bare(&self) -> bool {
        self.config.core.bare
    }

    /// working-tree root; errors for bare repositories
    pub fn worktree(&self) -> Result<&Path> {
        self.worktree.as_deref().ok_or(Error::BareDisallowed)
    }

    /// repository configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// mutable access to configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// save configuration changes
    pub fn save_config(&self) -> Result<()> {
        self.config.save(&self.storage.join("config"))
    }

    /// storage directory (`.version` or the bare root)
    pub fn storage_path(&self) -> &Path {
        &self.storage
    }

    /// path to the objects directory
    pub fn objects_path(&self) -> PathBuf {
        self.storage.join("objects")
    }

    /// path to the refs directory
    pub fn refs_path(&self) -> PathBuf {
        self.storage.join("refs")
    }

    /// path to the index file
    pub fn index_path(&self) -> PathBuf {
        self.storage.join("index")
    }

    /// path to the tmp directory (for atomic writes)
    pub fn tmp_path(&self) -> PathBuf {
        self.storage.join("tmp")
    }

    /// atomic file write: temp -> fsync -> rename
    pub(crate) fn atomic_write(&self, dest: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).with_path(parent)?;
        }

        let tmp_path = self.tmp_path().join(uuid::Uuid::new_v4().to_string());
        {
            let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
            tmp_file.write_all(bytes).with_path(&tmp_path)?;
            tmp_file.sync_all().with_path(&tmp_path)?;
        }

        fs::rename(&tmp_path, dest).with_path(dest)?;

        if let Some(parent) = dest.parent() {
            let dir = File::open(parent).with_path(parent)?;
            dir.sync_all().with_path(parent)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_repo_init() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("work");

        let repo = Repo::init(&repo_path, false).unwrap();

        let storage = repo_path.join(STORAGE_DIR);
        assert!(storage.join("objects").is_dir());
        assert!(storage.join("refs/heads").is_dir());
        assert!(storage.join("refs/remotes").is_dir());
        assert!(storage.join("config").is_file());
        assert_eq!(
            fs::read_to_string(storage.join("HEAD")).unwrap(),
            "ref: refs/heads/master\n"
        );
        assert!(!repo.is_bare());
        assert_eq!(repo.worktree().unwrap(), repo_path);
    }

    #[test]
    fn test_repo_init_bare() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("bare");

        let repo = Repo::init(&repo_path, true).unwrap();

        assert!(repo_path.join("objects").is_dir());
        assert!(repo_path.join("HEAD").is_file());
        assert!(repo.is_bare());
        assert!(matches!(repo.worktree(), Err(Error::BareDisallowed)));
    }

    #[test]
    fn test_repo_init_idempotent() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("work");

        Repo::init(&repo_path, false).unwrap();
        let reopened = Repo::init(&repo_path, false).unwrap();

        assert!(!reopened.is_bare());
    }

    #[test]
    fn test_repo_open_not_found() {
        let dir = tempdir().unwrap();
        let result = Repo::open(&dir.path().join("nowhere"));
        assert!(matches!(result, Err(Error::NotInRepo(_))));
    }

    #[test]
    fn test_repo_find_walks_parents() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("work");
        Repo::init(&repo_path, false).unwrap();

        let nested = repo_path.join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let repo = Repo::find(&nested).unwrap();
        assert_eq!(repo.worktree().unwrap(), repo_path);
    }

    #[test]
    fn test_repo_find_not_in_repo() {
        let dir = tempdir().unwrap();
        let result = Repo::find(dir.path());
        assert!(matches!(result, Err(Error::NotInRepo(_))));
    }

    #[test]
    fn test_atomic_write() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("work"), false).unwrap();

        let dest = repo.storage_path().join("refs/heads/master");
        repo.atomic_write(&dest, b"abc\n").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"abc\n");
    }
}
