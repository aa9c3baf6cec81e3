//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. `<data_dir>/config.kdl`
//! 3. Built-in defaults

use crate::Result;
use crate::config::{OutputFormat, RoadmapConfig, read_config};
use crate::gui::shared::Viewport;
use crate::models::DEFAULT_DATE_FORMAT;
use crate::storage::DEFAULT_STORAGE_KEY;
use serde::Serialize;
use std::path::Path;

pub const DEFAULT_CANVAS_WIDTH: u32 = 1200;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 800;
pub const DEFAULT_DEVICE_PIXEL_RATIO: f64 = 1.0;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from config.kdl
    ConfigFile,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::ConfigFile => write!(f, "config-file"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// First of CLI flag, config file, default.
fn pick<T>(cli: Option<T>, file: Option<T>, default: T) -> Resolved<T> {
    match (cli, file) {
        (Some(value), _) => Resolved::new(value, ValueSource::CliFlag),
        (None, Some(value)) => Resolved::new(value, ValueSource::ConfigFile),
        (None, None) => Resolved::new(default, ValueSource::Default),
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub storage_key: Resolved<String>,
    pub output_format: Resolved<OutputFormat>,
    pub canvas_width: Resolved<u32>,
    pub canvas_height: Resolved<u32>,
    pub device_pixel_ratio: Resolved<f64>,
    pub date_format: Resolved<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_with(&RoadmapConfig::default(), &ConfigOverrides::default())
    }
}

impl ResolvedConfig {
    pub fn storage_key(&self) -> &str {
        &self.storage_key.value
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }

    pub fn date_format(&self) -> &str {
        &self.date_format.value
    }

    /// The matrix surface described by the canvas settings.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.canvas_width.value as f64,
            self.canvas_height.value as f64,
            self.device_pixel_ratio.value,
        )
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub storage_key: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub canvas_width: Option<u32>,
    pub canvas_height: Option<u32>,
    pub device_pixel_ratio: Option<f64>,
    pub date_format: Option<String>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output format override.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Set canvas size overrides.
    pub fn with_canvas(mut self, width: Option<u32>, height: Option<u32>, dpr: Option<f64>) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self.device_pixel_ratio = dpr;
        self
    }
}

/// Resolve a loaded config file against CLI overrides.
pub fn resolve_with(file: &RoadmapConfig, overrides: &ConfigOverrides) -> ResolvedConfig {
    ResolvedConfig {
        storage_key: pick(
            overrides.storage_key.clone(),
            file.storage_key.clone(),
            DEFAULT_STORAGE_KEY.to_string(),
        ),
        output_format: pick(
            overrides.output_format,
            file.output_format,
            OutputFormat::default(),
        ),
        canvas_width: pick(overrides.canvas_width, file.canvas_width, DEFAULT_CANVAS_WIDTH),
        canvas_height: pick(
            overrides.canvas_height,
            file.canvas_height,
            DEFAULT_CANVAS_HEIGHT,
        ),
        device_pixel_ratio: pick(
            overrides.device_pixel_ratio,
            file.device_pixel_ratio,
            DEFAULT_DEVICE_PIXEL_RATIO,
        ),
        date_format: pick(
            overrides.date_format.clone(),
            file.date_format.clone(),
            DEFAULT_DATE_FORMAT.to_string(),
        ),
    }
}

/// Resolve configuration with full precedence chain.
///
/// Reads `<data_dir>/config.kdl` (a missing file counts as empty).
pub fn resolve_config(data_dir: &Path, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let file = read_config(data_dir)?;
    Ok(resolve_with(&file, overrides))
}
