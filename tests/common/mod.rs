//! Common test utilities for roadmap integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's `~/.local/share/roadmap/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// The `rmap()` method returns a `Command` that sets `RMAP_DATA_DIR`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an empty data directory.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the rmap binary with isolated data directory.
    pub fn rmap(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_rmap"));
        cmd.current_dir(self.data_dir.path());
        cmd.env("RMAP_DATA_DIR", self.data_dir.path());
        cmd.env_remove("RMAP_LOG");
        cmd
    }

    /// Run `rmap` with `args` and parse its JSON stdout.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.rmap().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "rmap {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Add a feature and return its id.
    pub fn add_feature(&self, name: &str, extra: &[&str]) -> String {
        let mut args = vec!["feature", "add", "--name", name];
        args.extend_from_slice(extra);
        let value = self.json(&args);
        value["feature"]["id"].as_str().unwrap().to_string()
    }

    /// Path of the stored feature list for the default key.
    pub fn store_path(&self) -> std::path::PathBuf {
        self.data_dir.path().join("store/roadmap_features.json")
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
