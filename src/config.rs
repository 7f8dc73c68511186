use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, IoResultExt, Result};

/// repository configuration stored in the `config` file
///
/// serialized as TOML: a `[core]` table with `bare` and one
/// `[remote.<name>]` table per configured remote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub core: Core,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub remote: BTreeMap<String, Remote>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Core {
    #[serde(default)]
    pub bare: bool,
}

/// a configured remote repository
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    pub url: String,
}

impl Config {
    /// create a new config
    pub fn new(bare: bool) -> Self {
        Self {
            core: Core { bare },
            remote: BTreeMap::new(),
        }
    }

    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)?;
        Ok(())
    }

    /// add a remote; duplicate names are rejected
    pub fn add_remote(&mut self, name: impl Into<String>, url: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.remote.contains_key(&name) {
            return Err(Error::RemoteAlreadyExists(name));
        }
        self.remote.insert(name, Remote { url: url.into() });
        Ok(())
    }

    /// url of a configured remote
    pub fn remote_url(&self, name: &str) -> Option<&str> {
        self.remote.get(name).map(|r| r.url.as_str())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(false)
    }
}
