use crate::models::config::{SyncConfig, CONFIG_FILE};
use crate::services::RecordStore;
use crate::Result;
use std::path::{Path, PathBuf};

/// Resolved project root, configuration and record store for one command
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub config: SyncConfig,
    pub store: RecordStore,
}

impl ProjectContext {
    /// Resolve the project from CLI flags
    ///
    /// `root` defaults to the current directory and `config_path` to
    /// `thmsync.toml` inside it. Relative paths in the config are resolved
    /// against the root.
    pub fn load(root: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let root = match root {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.join(CONFIG_FILE));
        let config = SyncConfig::load_from(&config_path)?;
        Ok(Self::with_config(root, config))
    }

    pub fn with_config(root: PathBuf, config: SyncConfig) -> Self {
        let store = RecordStore::new(root.join(&config.theorem_dir));
        Self {
            root,
            config,
            store,
        }
    }

    /// Resolve a path relative to the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}
