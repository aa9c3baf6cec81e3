//! Configuration for roadmap.
//!
//! User preferences live in a single KDL file, `<data_dir>/config.kdl`:
//!
//! - `storage-key` - Key the feature list is stored under
//! - `output-format` - "json" or "human"
//! - `canvas-width`, `canvas-height`, `device-pixel-ratio` - Matrix surface
//! - `date-format` - chrono `strftime` pattern for deadlines
//!
//! ## Precedence
//!
//! CLI flag > config.kdl > defaults. Use the [`resolver`] module for
//! resolution with source tracking.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, Resolved, ResolvedConfig, ValueSource, resolve_config, resolve_with,
};
pub use schema::{CONFIG_KEYS, OutputFormat, RoadmapConfig};

use crate::{Error, Result};
use kdl::KdlDocument;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the config inside the data directory.
pub const CONFIG_FILE: &str = "config.kdl";

/// Path of config.kdl for a data directory.
pub fn config_kdl_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Read config.kdl. A missing file yields an empty config.
pub fn read_config(data_dir: &Path) -> Result<RoadmapConfig> {
    let path = config_kdl_path(data_dir);
    if !path.exists() {
        return Ok(RoadmapConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let doc: KdlDocument = content
        .parse()
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    Ok(RoadmapConfig::from_kdl(&doc))
}

/// Write config.kdl, creating the data directory if needed.
pub fn write_config(data_dir: &Path, config: &RoadmapConfig) -> Result<()> {
    config.validate().map_err(Error::Config)?;
    fs::create_dir_all(data_dir)?;
    let path = config_kdl_path(data_dir);
    fs::write(&path, config.to_kdl().to_string())?;
    tracing::info!(path = %path.display(), "wrote config");
    Ok(())
}
