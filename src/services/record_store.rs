//! Record store - per-theorem record files on disk
//!
//! One `<key>.md` file per theorem, directly inside the theorem directory.

use crate::Result;
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const RECORD_EXTENSION: &str = "md";

/// Directory of per-theorem record files
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for a theorem key
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, RECORD_EXTENSION))
    }

    /// Keys (file stems) of every record, sorted
    pub fn list_keys(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            bail!("Theorem directory not found: {}", self.dir.display());
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.with_context(|| format!("Failed to list {}", self.dir.display()))?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().map_or(true, |ext| ext != RECORD_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                keys.push(stem.to_string_lossy().to_string());
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Read the record for a key
    pub fn read(&self, key: &str) -> Result<String> {
        let path = self.path_for(key);
        if !path.exists() {
            bail!("Record file not found: {}", path.display());
        }
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Overwrite the record for a key
    pub fn write(&self, key: &str, content: &str) -> Result<()> {
        let path = self.path_for(key);
        std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_keys_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Q42.md"), "").unwrap();
        fs::write(temp.path().join("Q100.md"), "").unwrap();
        fs::write(temp.path().join("Q9X.md"), "").unwrap();
        fs::write(temp.path().join("README.txt"), "").unwrap();
        fs::create_dir(temp.path().join("nested.md")).unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub").join("Q1.md"), "").unwrap();

        let store = RecordStore::new(temp.path());
        assert_eq!(store.list_keys().unwrap(), vec!["Q100", "Q42", "Q9X"]);
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::new(temp.path().join("_thm"));
        assert!(store.list_keys().is_err());
    }

    #[test]
    fn test_read_write() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::new(temp.path());
        assert!(store.read("Q1").is_err());

        store.write("Q1", "---\n# One\n---\n").unwrap();
        assert_eq!(store.read("Q1").unwrap(), "---\n# One\n---\n");
        assert_eq!(store.path_for("Q1"), temp.path().join("Q1.md"));
    }
}
