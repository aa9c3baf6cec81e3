//! Theme constants for the roadmap views
//!
//! Defines the color scheme used by the matrix renderer as Rust constants.
//! Colors are CSS color strings so they can be handed to a canvas unchanged.

use crate::models::{FeatureStatus, Quadrant};

/// Font family used for every text command
pub const FONT_FAMILY: &str = "Inter, system-ui, sans-serif";

/// Background colors
pub mod background {
    /// Surface background
    pub const SURFACE: &str = "#ffffff";
    /// Card background
    pub const CARD: &str = "#ffffff";
}

/// Text colors
pub mod text {
    /// Primary text color (feature names)
    pub const PRIMARY: &str = "#1e293b";
    /// Muted text color (descriptions, positions, dates)
    pub const MUTED: &str = "#64748b";
}

/// Shadow colors
pub mod shadow {
    pub const PANEL: &str = "rgba(0, 0, 0, 0.08)";
    pub const ROW: &str = "rgba(0, 0, 0, 0.06)";
    pub const BLOCKED_ROW: &str = "rgba(0, 0, 0, 0.1)";
    /// Scroll indicator fill
    pub const SCROLLBAR: &str = "rgba(0, 0, 0, 0.08)";
}

/// Blocked feature colors
pub mod blocked {
    /// Section title
    pub const TITLE: &str = "#ef4444";
    /// Row background
    pub const ROW: &str = "#FEE2E2";
    /// Status badge background
    pub const BADGE: &str = "#FEF2F2";
    /// Status badge text and reason text
    pub const TEXT: &str = "#EF4444";
    /// Lock marker
    pub const MARKER: &str = "#DC2626";
}

/// Colors of one quadrant panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadrantPalette {
    /// Badge background (translucent)
    pub bg: &'static str,
    /// Accent and label color
    pub text: &'static str,
    /// Card border
    pub border: &'static str,
    /// Gradient stops for accent fills
    pub gradient: [&'static str; 2],
}

/// High value quadrant (indigo)
pub const HIGH_VALUE: QuadrantPalette = QuadrantPalette {
    bg: "rgba(79, 70, 229, 0.08)",
    text: "#4F46E5",
    border: "rgba(79, 70, 229, 0.2)",
    gradient: ["#4F46E5", "#3730A3"],
};

/// Quick wins quadrant (emerald)
pub const QUICK_WINS: QuadrantPalette = QuadrantPalette {
    bg: "rgba(16, 185, 129, 0.08)",
    text: "#10B981",
    border: "rgba(16, 185, 129, 0.2)",
    gradient: ["#10B981", "#047857"],
};

/// Strategic quadrant (orange)
pub const STRATEGIC: QuadrantPalette = QuadrantPalette {
    bg: "rgba(249, 115, 22, 0.08)",
    text: "#F97316",
    border: "rgba(249, 115, 22, 0.2)",
    gradient: ["#F97316", "#C2410C"],
};

/// Foundation quadrant (violet)
pub const FOUNDATION: QuadrantPalette = QuadrantPalette {
    bg: "rgba(124, 58, 237, 0.08)",
    text: "#7C3AED",
    border: "rgba(124, 58, 237, 0.2)",
    gradient: ["#7C3AED", "#5B21B6"],
};

/// Get the palette for a quadrant
pub fn quadrant_palette(quadrant: Quadrant) -> &'static QuadrantPalette {
    match quadrant {
        Quadrant::HighValue => &HIGH_VALUE,
        Quadrant::QuickWins => &QUICK_WINS,
        Quadrant::Strategic => &STRATEGIC,
        Quadrant::Foundation => &FOUNDATION,
    }
}

/// Get the column/header color for a workflow status
pub fn status_color(status: FeatureStatus) -> &'static str {
    match status {
        FeatureStatus::Backlog => "#94a3b8",
        FeatureStatus::Todo => "#3b82f6",
        FeatureStatus::InProgress => "#eab308",
        FeatureStatus::Done => "#22c55e",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrant_palette() {
        assert_eq!(quadrant_palette(Quadrant::HighValue), &HIGH_VALUE);
        assert_eq!(quadrant_palette(Quadrant::QuickWins).text, "#10B981");
        assert_eq!(quadrant_palette(Quadrant::Strategic), &STRATEGIC);
        assert_eq!(quadrant_palette(Quadrant::Foundation), &FOUNDATION);
    }

    #[test]
    fn test_status_color() {
        assert_eq!(status_color(FeatureStatus::Backlog), "#94a3b8");
        assert_eq!(status_color(FeatureStatus::Done), "#22c55e");
    }
}
