//! Storage backend trait and implementations.
//!
//! This module provides the storage backends for roadmap data:
//! - `FileBackend` - One JSON file per key under `<data_dir>/store/` (default)
//! - `MemoryBackend` - In-process map, used by tests and the WASM viewer

use crate::config::schema::is_valid_storage_key;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Trait for storage backends that persist string values under keys.
pub trait KeyValueBackend {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;

    /// Get the backend type name.
    fn backend_type(&self) -> BackendType;
}

/// Available storage backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// JSON files under the data directory (default)
    File,
    /// Process memory, lost on exit
    Memory,
}

impl BackendType {
    /// Parse a backend type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "file" | "default" => Some(Self::File),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn check_key(key: &str) -> Result<()> {
    if is_valid_storage_key(key) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("Invalid storage key: {:?}", key)))
    }
}

/// Stores each key as `<root>/store/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at a data directory. Nothing is created until
    /// the first write.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.join("store"),
        }
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl KeyValueBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        check_key(key)?;
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        check_key(key)?;
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        // Write to a sibling temp file first so readers never see a torn file
        let tmp = self.root.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        check_key(key)?;
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn backend_type(&self) -> BackendType {
        BackendType::File
    }
}

/// Keeps values in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, e.g. records exported from the browser.
    pub fn with_value(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        check_key(key)?;
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        check_key(key)?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        check_key(key)?;
        self.values.remove(key);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backend_type_parse() {
        assert_eq!(BackendType::parse("FILE"), Some(BackendType::File));
        assert_eq!(BackendType::parse("memory"), Some(BackendType::Memory));
        assert_eq!(BackendType::parse("git"), None);
        assert_eq!(BackendType::File.to_string(), "file");
    }

    #[test]
    fn test_file_backend_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::new(dir.path());
        assert_eq!(backend.read("roadmap_features").unwrap(), None);

        backend.write("roadmap_features", "[]").unwrap();
        assert_eq!(
            backend.read("roadmap_features").unwrap().as_deref(),
            Some("[]")
        );
        assert!(dir.path().join("store/roadmap_features.json").exists());

        backend.remove("roadmap_features").unwrap();
        assert_eq!(backend.read("roadmap_features").unwrap(), None);
        backend.remove("roadmap_features").unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::new(dir.path());
        assert!(backend.write("../outside", "[]").is_err());
        assert!(backend.read("a/b").is_err());
        assert!(MemoryBackend::new().read("").is_err());
    }

    #[test]
    fn test_memory_backend() {
        let mut backend = MemoryBackend::new().with_value("k", "v");
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("v"));
        backend.write("k", "w").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("w"));
        backend.remove("k").unwrap();
        assert_eq!(backend.read("k").unwrap(), None);
        assert_eq!(backend.backend_type(), BackendType::Memory);
    }
}
