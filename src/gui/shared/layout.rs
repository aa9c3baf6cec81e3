//! Matrix layout geometry
//!
//! The drawing surface is split into a 2x2 grid of quadrant panels:
//!
//! ```text
//! +-------------+-------------+
//! | QUICK WINS  | HIGH VALUE  |
//! +-------------+-------------+
//! | FOUNDATION  | STRATEGIC   |
//! +-------------+-------------+
//! ```
//!
//! Each panel has a header followed by a vertically scrolling list window.
//! The blocked-only view uses the whole surface as a single panel.
//!
//! All coordinates are CSS pixels; the device pixel ratio only affects the
//! backing store size.

use crate::board::BucketKey;
use crate::models::Quadrant;
use serde::{Deserialize, Serialize};

/// 2D position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the point lies inside the rectangle. Edges are inclusive.
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Intersection of two rectangles, or `None` when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > x && bottom > y {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

/// Size of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: f64,
    /// Height in CSS pixels
    pub height: f64,
    /// Device pixels per CSS pixel
    pub device_pixel_ratio: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    /// Create a viewport. Non-finite or non-positive ratios fall back to 1.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            device_pixel_ratio,
        }
    }

    /// Backing store width in device pixels
    pub fn pixel_width(&self) -> u32 {
        (self.width * self.device_pixel_ratio).round() as u32
    }

    /// Backing store height in device pixels
    pub fn pixel_height(&self) -> u32 {
        (self.height * self.device_pixel_ratio).round() as u32
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Grid cell (column, row) of a quadrant
fn grid_cell(quadrant: Quadrant) -> (f64, f64) {
    match quadrant {
        Quadrant::QuickWins => (0.0, 0.0),
        Quadrant::HighValue => (1.0, 0.0),
        Quadrant::Foundation => (0.0, 1.0),
        Quadrant::Strategic => (1.0, 1.0),
    }
}

/// Panel rectangle of a quadrant
pub fn quadrant_rect(viewport: &Viewport, quadrant: Quadrant) -> Rect {
    let width = viewport.width / 2.0;
    let height = viewport.height / 2.0;
    let (col, row) = grid_cell(quadrant);
    Rect::new(col * width, row * height, width, height)
}

/// Quadrant under a point; the left and top halves are closed.
pub fn quadrant_at(viewport: &Viewport, point: Position) -> Quadrant {
    let right = point.x >= viewport.width / 2.0;
    let bottom = point.y >= viewport.height / 2.0;
    match (right, bottom) {
        (false, false) => Quadrant::QuickWins,
        (true, false) => Quadrant::HighValue,
        (false, true) => Quadrant::Foundation,
        (true, true) => Quadrant::Strategic,
    }
}

/// Geometry of panels and rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixLayout {
    /// Inner padding of a quadrant panel
    pub panel_padding: f64,
    /// Inner padding of the blocked-only view
    pub blocked_padding: f64,
    /// Distance from the panel content origin to the first row
    pub header_height: f64,
    pub row_height: f64,
    pub row_spacing: f64,
    /// Inset of the panel card from the quadrant edge
    pub card_inset: f64,
    pub card_radius: f64,
    pub row_radius: f64,
    pub scrollbar_width: f64,
}

impl Default for MatrixLayout {
    fn default() -> Self {
        Self {
            panel_padding: 24.0,
            blocked_padding: 20.0,
            header_height: 80.0,
            row_height: 50.0,
            row_spacing: 12.0,
            card_inset: 8.0,
            card_radius: 12.0,
            row_radius: 8.0,
            scrollbar_width: 4.0,
        }
    }
}

impl MatrixLayout {
    /// Panel rectangle of a bucket. The blocked list covers the whole surface.
    pub fn panel_rect(&self, viewport: &Viewport, bucket: BucketKey) -> Rect {
        match bucket {
            BucketKey::Quadrant(quadrant) => quadrant_rect(viewport, quadrant),
            BucketKey::Blocked => viewport.bounds(),
        }
    }

    pub fn padding(&self, bucket: BucketKey) -> f64 {
        match bucket {
            BucketKey::Quadrant(_) => self.panel_padding,
            BucketKey::Blocked => self.blocked_padding,
        }
    }

    /// Content origin of a panel (top-left inside the padding)
    pub fn content_origin(&self, viewport: &Viewport, bucket: BucketKey) -> Position {
        let panel = self.panel_rect(viewport, bucket);
        let padding = self.padding(bucket);
        Position::new(panel.x + padding, panel.y + padding)
    }

    /// The scrolling list window of a bucket.
    ///
    /// Spans from the first row position down to the panel's bottom padding.
    pub fn list_window(&self, viewport: &Viewport, bucket: BucketKey) -> Rect {
        let panel = self.panel_rect(viewport, bucket);
        let padding = self.padding(bucket);
        let top = panel.y + padding + self.header_height;
        let bottom = panel.y + panel.height - padding;
        Rect::new(
            panel.x + padding,
            top,
            (panel.width - 2.0 * padding).max(0.0),
            (bottom - top).max(0.0),
        )
    }

    /// Vertical distance between consecutive row tops
    pub fn row_pitch(&self) -> f64 {
        self.row_height + self.row_spacing
    }

    /// Total list height for `rows` rows
    pub fn content_height(&self, rows: usize) -> f64 {
        rows as f64 * self.row_pitch()
    }

    /// Largest scroll offset of a bucket holding `rows` rows
    pub fn max_scroll(&self, viewport: &Viewport, bucket: BucketKey, rows: usize) -> f64 {
        let window = self.list_window(viewport, bucket);
        (self.content_height(rows) - window.height).max(0.0)
    }

    /// Unclipped rectangle of row `index` at the given scroll offset
    pub fn row_rect(&self, window: &Rect, index: usize, scroll: f64) -> Rect {
        Rect::new(
            window.x,
            window.y + index as f64 * self.row_pitch() - scroll,
            window.width,
            self.row_height,
        )
    }
}
