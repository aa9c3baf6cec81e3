//! Abstract rendering commands for the roadmap views
//!
//! This module provides platform-agnostic rendering primitives. The matrix
//! renderer produces a list of [`RenderCommand`]s which a backend (an HTML
//! canvas in the browser, JSON on the command line) replays in order.
//!
//! Text width is measured through the [`TextMeasure`] trait so layout that
//! depends on it (badge widths, name truncation) works without a canvas.

use super::theme;
use serde::{Deserialize, Serialize};

/// A render command that can be executed on any rendering backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    /// Draw a filled rectangle
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: String,
        corner_radius: f64,
    },
    /// Draw a stroked rectangle
    StrokeRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: String,
        line_width: f64,
        corner_radius: f64,
    },
    /// Draw a line
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: String,
        line_width: f64,
    },
    /// Draw text
    Text {
        x: f64,
        y: f64,
        text: String,
        color: String,
        font: Font,
        align: TextAlign,
        baseline: TextBaseline,
    },
    /// Restrict subsequent drawing to a rectangle until the next `Restore`
    ClipRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Set a drop shadow for subsequent fills
    SetShadow {
        color: String,
        blur: f64,
        offset_y: f64,
    },
    /// Remove the drop shadow
    ClearShadow,
    /// Save the current transform and clip state
    Save,
    /// Restore the previous transform and clip state
    Restore,
    /// Scale the coordinate system
    Scale { x: f64, y: f64 },
    /// Clear the canvas
    Clear { color: String },
}

/// Font weight for text rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Normal,
    Medium,
    SemiBold,
    Bold,
}

impl FontWeight {
    /// Numeric CSS weight
    pub fn css_weight(&self) -> u16 {
        match self {
            FontWeight::Normal => 400,
            FontWeight::Medium => 500,
            FontWeight::SemiBold => 600,
            FontWeight::Bold => 700,
        }
    }
}

/// Font used by a text command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub size: f64,
    pub weight: FontWeight,
}

impl Font {
    pub const fn new(size: f64, weight: FontWeight) -> Self {
        Self { size, weight }
    }

    /// CSS font shorthand, e.g. `600 16px Inter, system-ui, sans-serif`
    pub fn css(&self) -> String {
        format!(
            "{} {}px {}",
            self.weight.css_weight(),
            self.size,
            theme::FONT_FAMILY
        )
    }
}

/// Text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Text baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextBaseline {
    Top,
    Middle,
    Bottom,
    #[default]
    Alphabetic,
}

impl TextBaseline {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
            TextBaseline::Bottom => "bottom",
            TextBaseline::Alphabetic => "alphabetic",
        }
    }
}

/// Measures the rendered width of a string in a given font.
pub trait TextMeasure {
    fn measure_text(&self, text: &str, font: &Font) -> f64;
}

/// Width estimate used when no real font metrics are available.
///
/// Every character is assumed to be `font.size * ratio` wide, with a slightly
/// wider ratio for heavier weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateMeasure {
    pub ratio: f64,
}

impl Default for ApproximateMeasure {
    fn default() -> Self {
        Self { ratio: 0.55 }
    }
}

impl TextMeasure for ApproximateMeasure {
    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        let ratio = match font.weight {
            FontWeight::Normal | FontWeight::Medium => self.ratio,
            FontWeight::SemiBold | FontWeight::Bold => self.ratio + 0.05,
        };
        text.chars().count() as f64 * font.size * ratio
    }
}

const ELLIPSIS: &str = "...";

/// Truncate text so it fits in `max_width`, appending "..." when shortened.
///
/// Returns the text unchanged when it already fits. Otherwise characters are
/// removed from the end until the truncated text plus "..." fits; in the
/// worst case only "..." remains.
pub fn truncate_to_width(
    measure: &dyn TextMeasure,
    text: &str,
    font: &Font,
    max_width: f64,
) -> String {
    if measure.measure_text(text, font) <= max_width {
        return text.to_string();
    }

    let mut truncated = text.to_string();
    while !truncated.is_empty() {
        truncated.pop();
        let candidate = format!("{}{}", truncated, ELLIPSIS);
        if measure.measure_text(&candidate, font) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// Shorthand for a left-aligned alphabetic text command
pub fn text(x: f64, y: f64, content: impl Into<String>, color: &str, font: Font) -> RenderCommand {
    RenderCommand::Text {
        x,
        y,
        text: content.into(),
        color: color.to_string(),
        font,
        align: TextAlign::Left,
        baseline: TextBaseline::Alphabetic,
    }
}

/// Shorthand for a right-aligned alphabetic text command
pub fn text_right(
    x: f64,
    y: f64,
    content: impl Into<String>,
    color: &str,
    font: Font,
) -> RenderCommand {
    RenderCommand::Text {
        x,
        y,
        text: content.into(),
        color: color.to_string(),
        font,
        align: TextAlign::Right,
        baseline: TextBaseline::Alphabetic,
    }
}
