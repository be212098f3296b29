//! Sync configuration (`thmsync.toml`)

use crate::models::downstream::DownstreamFields;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the project root
pub const CONFIG_FILE: &str = "thmsync.toml";

/// thmsync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Directory holding one `<key>.md` record per theorem
    pub theorem_dir: PathBuf,

    /// Where `downstream` writes the aggregate file
    pub downstream_file: PathBuf,

    /// Canonical Lean URL is this prefix followed by the theorem key
    pub canonical_url_prefix: String,

    /// Theorem keys reconciliation must leave alone
    pub skip_keys: Vec<String>,

    /// Downstream schema field names
    pub downstream_fields: DownstreamFields,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            theorem_dir: PathBuf::from("_thm"),
            downstream_file: PathBuf::from("generated-1000.yaml"),
            canonical_url_prefix: "https://leanprover-community.github.io/1000.html#".to_string(),
            skip_keys: Vec::new(),
            downstream_fields: DownstreamFields::default(),
        }
    }
}

impl SyncConfig {
    /// Load config from `thmsync.toml` in the project root, or defaults if absent
    pub fn load(project_root: &Path) -> anyhow::Result<Self> {
        Self::load_from(&project_root.join(CONFIG_FILE))
    }

    /// Load config from an explicit path, or defaults if absent
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: SyncConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        Ok(config)
    }

    pub fn canonical_url(&self, key: &str) -> String {
        format!("{}{}", self.canonical_url_prefix, key)
    }

    pub fn is_skipped(&self, key: &str) -> bool {
        self.skip_keys.iter().any(|k| k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = SyncConfig::load(temp.path()).unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.theorem_dir, PathBuf::from("_thm"));
    }

    #[test]
    fn test_partial_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE),
            r#"
theorem_dir = "records"
skip_keys = ["Q11518"]

[downstream_fields]
authors = "author"
"#,
        )
        .unwrap();

        let config = SyncConfig::load(temp.path()).unwrap();
        assert_eq!(config.theorem_dir, PathBuf::from("records"));
        assert!(config.is_skipped("Q11518"));
        assert!(!config.is_skipped("Q1"));
        assert_eq!(config.downstream_fields.authors, "author");
        assert_eq!(config.downstream_fields.decl, "decl");
        assert_eq!(config.downstream_file, PathBuf::from("generated-1000.yaml"));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE), "skip_keys = 3\n").unwrap();
        assert!(SyncConfig::load(temp.path()).is_err());
    }

    #[test]
    fn test_canonical_url() {
        let config = SyncConfig::default();
        assert_eq!(
            config.canonical_url("Q42X"),
            "https://leanprover-community.github.io/1000.html#Q42X"
        );
    }
}
