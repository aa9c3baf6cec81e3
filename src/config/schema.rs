//! KDL schema definitions for config.kdl.
//!
//! This module provides:
//! - The Rust struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation and key-based access for `rmap config set`

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys accepted in config.kdl
pub const CONFIG_KEYS: [&str; 6] = [
    "storage-key",
    "output-format",
    "canvas-width",
    "canvas-height",
    "device-pixel-ratio",
    "date-format",
];

/// User preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// storage-key "roadmap_features"
/// output-format "human"  // or "json"
/// canvas-width 1200
/// canvas-height 800
/// device-pixel-ratio 2.0
/// date-format "%b %d, %Y"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadmapConfig {
    /// Key the feature list is stored under
    pub storage_key: Option<String>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Matrix surface width in CSS pixels
    pub canvas_width: Option<u32>,

    /// Matrix surface height in CSS pixels
    pub canvas_height: Option<u32>,

    pub device_pixel_ratio: Option<f64>,

    /// chrono `strftime` pattern for deadlines
    pub date_format: Option<String>,
}

fn first_entry<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .map(|entry| entry.value())
}

/// Whether a storage key is usable as a file stem.
pub fn is_valid_storage_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !key.starts_with('.')
}

impl RoadmapConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref key) = self.storage_key {
            if !is_valid_storage_key(key) {
                return Err(format!(
                    "storage-key may only contain letters, digits, '_', '-' and '.', got {:?}",
                    key
                ));
            }
        }
        for (name, value) in [
            ("canvas-width", self.canvas_width),
            ("canvas-height", self.canvas_height),
        ] {
            if value == Some(0) {
                return Err(format!("{} must be positive", name));
            }
        }
        if let Some(dpr) = self.device_pixel_ratio {
            if !dpr.is_finite() || dpr <= 0.0 {
                return Err(format!("device-pixel-ratio must be positive, got {}", dpr));
            }
        }
        if let Some(ref pattern) = self.date_format {
            if pattern.trim().is_empty() {
                return Err("date-format must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Values of the wrong type or out of range are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(s) = first_entry(doc, "storage-key").and_then(|v| v.as_string()) {
            if is_valid_storage_key(s) {
                config.storage_key = Some(s.to_string());
            }
        }

        if let Some(s) = first_entry(doc, "output-format").and_then(|v| v.as_string()) {
            config.output_format = OutputFormat::parse(s);
        }

        if let Some(i) = first_entry(doc, "canvas-width").and_then(|v| v.as_integer()) {
            config.canvas_width = u32::try_from(i).ok().filter(|w| *w > 0);
        }

        if let Some(i) = first_entry(doc, "canvas-height").and_then(|v| v.as_integer()) {
            config.canvas_height = u32::try_from(i).ok().filter(|h| *h > 0);
        }

        if let Some(value) = first_entry(doc, "device-pixel-ratio") {
            let dpr = value
                .as_float()
                .or_else(|| value.as_integer().map(|i| i as f64));
            config.device_pixel_ratio = dpr.filter(|d| d.is_finite() && *d > 0.0);
        }

        if let Some(s) = first_entry(doc, "date-format").and_then(|v| v.as_string()) {
            if !s.trim().is_empty() {
                config.date_format = Some(s.to_string());
            }
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();
        let mut push = |name: &str, value: KdlValue| {
            let mut node = KdlNode::new(name);
            node.push(KdlEntry::new(value));
            doc.nodes_mut().push(node);
        };

        if let Some(ref key) = self.storage_key {
            push("storage-key", KdlValue::String(key.clone()));
        }
        if let Some(format) = self.output_format {
            push(
                "output-format",
                KdlValue::String(format.as_str().to_string()),
            );
        }
        if let Some(width) = self.canvas_width {
            push("canvas-width", KdlValue::Integer(width as i128));
        }
        if let Some(height) = self.canvas_height {
            push("canvas-height", KdlValue::Integer(height as i128));
        }
        if let Some(dpr) = self.device_pixel_ratio {
            push("device-pixel-ratio", KdlValue::Float(dpr));
        }
        if let Some(ref pattern) = self.date_format {
            push("date-format", KdlValue::String(pattern.clone()));
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &RoadmapConfig) {
        if other.storage_key.is_some() {
            self.storage_key = other.storage_key.clone();
        }
        if other.output_format.is_some() {
            self.output_format = other.output_format;
        }
        if other.canvas_width.is_some() {
            self.canvas_width = other.canvas_width;
        }
        if other.canvas_height.is_some() {
            self.canvas_height = other.canvas_height;
        }
        if other.device_pixel_ratio.is_some() {
            self.device_pixel_ratio = other.device_pixel_ratio;
        }
        if other.date_format.is_some() {
            self.date_format = other.date_format.clone();
        }
    }

    /// Current value of a key as a display string.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "storage-key" => self.storage_key.clone(),
            "output-format" => self.output_format.map(|f| f.as_str().to_string()),
            "canvas-width" => self.canvas_width.map(|w| w.to_string()),
            "canvas-height" => self.canvas_height.map(|h| h.to_string()),
            "device-pixel-ratio" => self.device_pixel_ratio.map(|d| d.to_string()),
            "date-format" => self.date_format.clone(),
            _ => None,
        }
    }

    /// Set a key from its string form, as given to `rmap config set`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let mut updated = self.clone();
        match key {
            "storage-key" => updated.storage_key = Some(value.to_string()),
            "output-format" => {
                updated.output_format = Some(OutputFormat::parse(value).ok_or_else(|| {
                    format!("output-format must be 'json' or 'human', got {:?}", value)
                })?)
            }
            "canvas-width" | "canvas-height" => {
                let parsed = value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| format!("{} must be a positive integer, got {:?}", key, value))?;
                if key == "canvas-width" {
                    updated.canvas_width = Some(parsed);
                } else {
                    updated.canvas_height = Some(parsed);
                }
            }
            "device-pixel-ratio" => {
                updated.device_pixel_ratio = Some(value.trim().parse::<f64>().map_err(|_| {
                    format!("device-pixel-ratio must be a number, got {:?}", value)
                })?)
            }
            "date-format" => updated.date_format = Some(value.to_string()),
            _ => {
                return Err(format!(
                    "unknown config key {:?} (expected one of: {})",
                    key,
                    CONFIG_KEYS.join(", ")
                ));
            }
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}
