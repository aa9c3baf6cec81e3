//! Value/effort matrix renderer
//!
//! Turns a [`QuadrantBoard`] into a [`Frame`]: the drawing commands for one
//! pass plus the hit regions and scroll limits that pass produced. Frames are
//! built from scratch each time; nothing is carried between calls except
//! what the caller passes in.

use super::hit_test::{HitRegion, HitRegistry};
use super::layout::{MatrixLayout, Rect, Viewport};
use super::render::{
    Font, FontWeight, RenderCommand, TextMeasure, text, text_right, truncate_to_width,
};
use super::scroll::ScrollState;
use super::theme::{self, QuadrantPalette};
use crate::board::{BucketKey, QuadrantBoard, ScoredFeature};
use crate::models::scoring::format_score;
use crate::models::{Quadrant, format_date};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TITLE_FONT: Font = Font::new(24.0, FontWeight::Bold);
const LABEL_FONT: Font = Font::new(16.0, FontWeight::SemiBold);
const DESCRIPTION_FONT: Font = Font::new(13.0, FontWeight::Normal);
const POSITION_FONT: Font = Font::new(12.0, FontWeight::Medium);
const BADGE_FONT: Font = Font::new(12.0, FontWeight::Medium);
const NAME_FONT: Font = Font::new(14.0, FontWeight::Medium);
const DATE_FONT: Font = Font::new(12.0, FontWeight::Normal);
const SCORE_FONT: Font = Font::new(14.0, FontWeight::SemiBold);
const BLOCKED_BADGE_FONT: Font = Font::new(12.0, FontWeight::Normal);
const BLOCKED_NAME_FONT: Font = Font::new(14.0, FontWeight::Normal);

const LOCK_MARKER: &str = "\u{1F512}";
const BADGE_HEIGHT: f64 = 22.0;
/// Space reserved right of the name for the deadline and score columns
const TRAILING_COLUMNS: f64 = 160.0;

/// Which lists the matrix shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// The four quadrant panels
    #[default]
    Quadrants,
    /// Only the blocked list, covering the whole surface
    BlockedOnly,
}

/// Inputs of one render pass besides the board and text measurer
#[derive(Debug, Clone)]
pub struct MatrixParams<'a> {
    pub viewport: Viewport,
    pub mode: ViewMode,
    pub scroll: &'a ScrollState,
    pub layout: &'a MatrixLayout,
    /// `strftime` pattern for deadlines
    pub date_format: &'a str,
}

/// Output of one render pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    pub commands: Vec<RenderCommand>,
    pub hits: HitRegistry,
    /// Maximum scroll offset of every bucket drawn in this frame
    pub scroll_limits: BTreeMap<BucketKey, f64>,
}

impl Frame {
    fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    fn fill(&mut self, rect: Rect, color: &str, corner_radius: f64) {
        self.push(RenderCommand::FillRect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            color: color.to_string(),
            corner_radius,
        });
    }

    fn shadow(&mut self, color: &str, blur: f64, offset_y: f64) {
        self.push(RenderCommand::SetShadow {
            color: color.to_string(),
            blur,
            offset_y,
        });
    }
}

/// Render the matrix.
pub fn render_matrix(
    board: &QuadrantBoard,
    params: &MatrixParams,
    measure: &dyn TextMeasure,
) -> Frame {
    let mut frame = Frame::default();
    let dpr = params.viewport.device_pixel_ratio;

    frame.push(RenderCommand::Scale { x: dpr, y: dpr });
    frame.push(RenderCommand::Clear {
        color: theme::background::SURFACE.to_string(),
    });

    match params.mode {
        ViewMode::Quadrants => {
            for quadrant in Quadrant::ALL {
                render_quadrant(&mut frame, board, quadrant, params, measure);
            }
        }
        ViewMode::BlockedOnly => render_blocked(&mut frame, board, params, measure),
    }

    tracing::debug!(
        commands = frame.commands.len(),
        hits = frame.hits.len(),
        mode = ?params.mode,
        "rendered matrix frame"
    );
    frame
}

/// A row that intersects its list window
struct VisibleRow<'a> {
    index: usize,
    item: &'a ScoredFeature,
    rect: Rect,
    clipped: Rect,
}

/// Rows of a bucket that intersect the window at the given scroll offset.
fn visible_rows<'a>(
    layout: &MatrixLayout,
    window: &Rect,
    rows: &'a [ScoredFeature],
    scroll: f64,
) -> Vec<VisibleRow<'a>> {
    let first = (scroll / layout.row_pitch()).floor().max(0.0) as usize;
    let mut visible = Vec::new();
    for (index, item) in rows.iter().enumerate().skip(first) {
        let rect = layout.row_rect(window, index, scroll);
        if rect.y >= window.bottom() {
            break;
        }
        if let Some(clipped) = rect.intersect(window) {
            visible.push(VisibleRow {
                index,
                item,
                rect,
                clipped,
            });
        }
    }
    visible
}

/// Clamp the bucket's offset, record its limit and return the offset to draw with.
fn effective_scroll(frame: &mut Frame, params: &MatrixParams, bucket: BucketKey, rows: usize) -> f64 {
    let max = params.layout.max_scroll(&params.viewport, bucket, rows);
    frame.scroll_limits.insert(bucket, max);
    params.scroll.offset(bucket).clamp(0.0, max)
}

/// Draw a bucket's visible rows clipped to its window and register their hit regions.
fn render_list<F>(
    frame: &mut Frame,
    params: &MatrixParams,
    bucket: BucketKey,
    rows: &[ScoredFeature],
    scroll: f64,
    mut draw_row: F,
) where
    F: FnMut(&mut Frame, &VisibleRow),
{
    let window = params.layout.list_window(&params.viewport, bucket);
    let visible = visible_rows(params.layout, &window, rows, scroll);
    if visible.is_empty() {
        return;
    }

    frame.push(RenderCommand::Save);
    frame.push(RenderCommand::ClipRect {
        x: window.x,
        y: window.y,
        width: window.width,
        height: window.height,
    });
    for row in &visible {
        draw_row(frame, row);
        frame.hits.push(HitRegion {
            rect: row.clipped,
            feature_id: row.item.id().to_string(),
            bucket,
            index: row.index,
        });
    }
    frame.push(RenderCommand::Restore);
}

fn render_scrollbar(frame: &mut Frame, params: &MatrixParams, bucket: BucketKey, rows: usize, scroll: f64) {
    let layout = params.layout;
    let panel = layout.panel_rect(&params.viewport, bucket);
    let window = layout.list_window(&params.viewport, bucket);
    let content = layout.content_height(rows);
    if content <= window.height || window.height <= 0.0 {
        return;
    }

    let bar_height = window.height * (window.height / content);
    let bar_y = window.y + (scroll / content) * window.height;
    let bar_x = panel.right() - layout.scrollbar_width - 12.0;
    frame.fill(
        Rect::new(bar_x, bar_y, layout.scrollbar_width, bar_height),
        theme::shadow::SCROLLBAR,
        layout.scrollbar_width / 2.0,
    );
}

fn render_quadrant(
    frame: &mut Frame,
    board: &QuadrantBoard,
    quadrant: Quadrant,
    params: &MatrixParams,
    measure: &dyn TextMeasure,
) {
    let layout = params.layout;
    let bucket = BucketKey::Quadrant(quadrant);
    let palette = theme::quadrant_palette(quadrant);
    let panel = layout.panel_rect(&params.viewport, bucket);
    let origin = layout.content_origin(&params.viewport, bucket);
    let rows = board.quadrant(quadrant);
    let scroll = effective_scroll(frame, params, bucket, rows.len());

    let card = Rect::new(
        panel.x + layout.card_inset,
        panel.y + layout.card_inset,
        (panel.width - 2.0 * layout.card_inset).max(0.0),
        (panel.height - 2.0 * layout.card_inset).max(0.0),
    );
    frame.shadow(theme::shadow::PANEL, 12.0, 2.0);
    frame.fill(card, theme::background::CARD, layout.card_radius);
    frame.push(RenderCommand::ClearShadow);
    frame.push(RenderCommand::StrokeRect {
        x: card.x,
        y: card.y,
        width: card.width,
        height: card.height,
        color: palette.border.to_string(),
        line_width: 1.0,
        corner_radius: layout.card_radius,
    });

    frame.push(RenderCommand::Line {
        x1: origin.x,
        y1: origin.y + 40.0,
        x2: origin.x + 40.0,
        y2: origin.y + 40.0,
        color: palette.text.to_string(),
        line_width: 2.0,
    });
    frame.push(text(
        origin.x + 48.0,
        origin.y + 24.0,
        quadrant.label(),
        palette.text,
        LABEL_FONT,
    ));
    frame.push(text(
        origin.x + 48.0,
        origin.y + 44.0,
        quadrant.description(),
        theme::text::MUTED,
        DESCRIPTION_FONT,
    ));

    render_list(frame, params, bucket, rows, scroll, |frame, row| {
        render_quadrant_row(frame, row, palette, params, measure)
    });
    render_scrollbar(frame, params, bucket, rows.len(), scroll);
}

/// Quadrant lists never hold blocked features; those are drawn by
/// [`render_blocked_row`].
fn render_quadrant_row(
    frame: &mut Frame,
    row: &VisibleRow,
    palette: &QuadrantPalette,
    params: &MatrixParams,
    measure: &dyn TextMeasure,
) {
    let feature = &row.item.feature;
    let rect = row.rect;

    frame.shadow(theme::shadow::ROW, 8.0, 1.0);
    frame.fill(rect, theme::background::CARD, params.layout.row_radius);
    frame.push(RenderCommand::ClearShadow);

    let badge_y = rect.y + 16.0;
    let baseline = badge_y + 15.0;
    let x = rect.x + 12.0;

    frame.push(text(
        x + 4.0,
        baseline,
        (row.index + 1).to_string(),
        theme::text::MUTED,
        POSITION_FONT,
    ));
    let x = x + 24.0;

    let label = feature.status.label();
    let badge_width = measure.measure_text(label, &BADGE_FONT) + 16.0;
    frame.fill(Rect::new(x, badge_y, badge_width, BADGE_HEIGHT), palette.bg, 6.0);
    frame.push(text(x + 8.0, baseline, label, palette.text, BADGE_FONT));

    let name_x = x + badge_width + 12.0;
    let name_width = rect.width - badge_width - TRAILING_COLUMNS;
    let name = truncate_to_width(measure, &feature.name, &NAME_FONT, name_width);
    frame.push(text(name_x, baseline, name, theme::text::PRIMARY, NAME_FONT));

    if let Some(deadline) = feature.deadline {
        frame.push(text_right(
            rect.right() - 80.0,
            baseline,
            format_date(deadline, params.date_format),
            theme::text::MUTED,
            DATE_FONT,
        ));
    }

    frame.push(text_right(
        rect.right() - 16.0,
        baseline,
        format_score(row.item.score),
        palette.text,
        SCORE_FONT,
    ));
}

fn render_blocked(
    frame: &mut Frame,
    board: &QuadrantBoard,
    params: &MatrixParams,
    measure: &dyn TextMeasure,
) {
    let bucket = BucketKey::Blocked;
    let origin = params.layout.content_origin(&params.viewport, bucket);
    let rows = &board.blocked;
    let scroll = effective_scroll(frame, params, bucket, rows.len());

    frame.push(text(
        origin.x,
        origin.y + 40.0,
        "Blocked features",
        theme::blocked::TITLE,
        TITLE_FONT,
    ));

    if rows.is_empty() {
        frame.push(text(
            origin.x,
            origin.y + params.layout.header_height + 25.0,
            "No blocked features",
            theme::text::MUTED,
            BLOCKED_NAME_FONT,
        ));
        return;
    }

    render_list(frame, params, bucket, rows, scroll, |frame, row| {
        render_blocked_row(frame, row, params, measure)
    });
    render_scrollbar(frame, params, bucket, rows.len(), scroll);
}

fn render_blocked_row(
    frame: &mut Frame,
    row: &VisibleRow,
    params: &MatrixParams,
    measure: &dyn TextMeasure,
) {
    let feature = &row.item.feature;
    let rect = row.rect;

    frame.shadow(theme::shadow::BLOCKED_ROW, 4.0, 2.0);
    frame.fill(rect, theme::blocked::ROW, params.layout.row_radius);
    frame.push(RenderCommand::ClearShadow);

    let baseline = rect.y + 29.0;
    frame.push(text(
        rect.x + 16.0,
        baseline,
        LOCK_MARKER,
        theme::blocked::MARKER,
        DATE_FONT,
    ));

    let badge_x = rect.x + 50.0;
    let label = feature.status.label();
    let badge_width = measure.measure_text(label, &BLOCKED_BADGE_FONT) + 16.0;
    frame.fill(
        Rect::new(badge_x, baseline - 15.0, badge_width, BADGE_HEIGHT),
        theme::blocked::BADGE,
        6.0,
    );
    frame.push(text(
        badge_x + 8.0,
        baseline,
        label,
        theme::blocked::TEXT,
        BLOCKED_BADGE_FONT,
    ));

    let name_x = badge_x + badge_width + 20.0;
    frame.push(text(
        name_x,
        baseline,
        feature.name.clone(),
        theme::text::PRIMARY,
        BLOCKED_NAME_FONT,
    ));
    frame.push(text(
        name_x,
        baseline + 16.0,
        format!("Blocked: {}", feature.block_reason),
        theme::blocked::TEXT,
        BLOCKED_BADGE_FONT,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{StatusFilter, organize_quadrants};
    use crate::gui::shared::layout::Position;
    use crate::gui::shared::render::ApproximateMeasure;
    use crate::models::{DEFAULT_DATE_FORMAT, Feature, FeatureStatus};

    fn feature(id: &str, impact: f64, effort: f64, reach: f64) -> Feature {
        let mut f = Feature::new(id, format!("Feature {}", id));
        f.impact = impact;
        f.effort = effort;
        f.reach = reach;
        f.confidence = 100.0;
        f
    }

    fn render(board: &QuadrantBoard, mode: ViewMode, scroll: &ScrollState) -> Frame {
        let layout = MatrixLayout::default();
        let params = MatrixParams {
            viewport: Viewport::new(1200.0, 800.0, 2.0),
            mode,
            scroll,
            layout: &layout,
            date_format: DEFAULT_DATE_FORMAT,
        };
        render_matrix(board, &params, &ApproximateMeasure::default())
    }

    fn texts(frame: &Frame) -> Vec<&str> {
        frame
            .commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_prologue_scales_then_clears() {
        let frame = render(&QuadrantBoard::default(), ViewMode::Quadrants, &ScrollState::new());
        assert_eq!(frame.commands[0], RenderCommand::Scale { x: 2.0, y: 2.0 });
        assert!(matches!(frame.commands[1], RenderCommand::Clear { .. }));
    }

    #[test]
    fn test_empty_board_draws_headers_only() {
        let frame = render(&QuadrantBoard::default(), ViewMode::Quadrants, &ScrollState::new());
        assert!(frame.hits.is_empty());
        let labels = texts(&frame);
        for quadrant in Quadrant::ALL {
            assert!(labels.contains(&quadrant.label()));
        }
        assert_eq!(frame.scroll_limits.len(), 4);
    }

    #[test]
    fn test_one_hit_region_per_drawn_row() {
        let features = vec![
            feature("a", 3.0, 1.0, 500.0),
            feature("b", 3.0, 2.0, 100.0),
            feature("c", 1.0, 5.0, 100.0),
        ];
        let board = organize_quadrants(&features, &StatusFilter::new());
        let frame = render(&board, ViewMode::Quadrants, &ScrollState::new());
        assert_eq!(frame.hits.len(), 3);

        // quick wins list window starts at (24, 104)
        let hit = frame.hits.hit_test(Position::new(100.0, 120.0)).unwrap();
        assert_eq!(hit.feature_id, "a");
        let hit = frame.hits.hit_test(Position::new(100.0, 104.0 + 62.0 + 10.0)).unwrap();
        assert_eq!(hit.feature_id, "b");
        // gap between rows
        assert!(frame.hits.hit_test(Position::new(100.0, 104.0 + 55.0)).is_none());
        // strategic panel
        let hit = frame.hits.hit_test(Position::new(700.0, 520.0)).unwrap();
        assert_eq!(hit.feature_id, "c");
    }

    #[test]
    fn test_rows_outside_window_are_skipped() {
        let features: Vec<Feature> = (0..10)
            .map(|i| feature(&i.to_string(), 3.0, 1.0, 100.0 - i as f64))
            .collect();
        let board = organize_quadrants(&features, &StatusFilter::new());
        let frame = render(&board, ViewMode::Quadrants, &ScrollState::new());
        // window height 272 fits 4 full rows and part of a fifth
        assert_eq!(frame.hits.len(), 5);
        let last = frame.hits.iter().last().unwrap();
        assert_eq!(last.rect.bottom(), 376.0);
        assert!(last.rect.height < 50.0);
    }

    #[test]
    fn test_scroll_offset_moves_rows() {
        let features: Vec<Feature> = (0..10)
            .map(|i| feature(&i.to_string(), 3.0, 1.0, 100.0 - i as f64))
            .collect();
        let board = organize_quadrants(&features, &StatusFilter::new());
        let mut scroll = ScrollState::new();
        let key = BucketKey::Quadrant(Quadrant::QuickWins);
        scroll.set(key, 62.0, 1000.0);
        let frame = render(&board, ViewMode::Quadrants, &scroll);
        let first = frame.hits.iter().next().unwrap();
        assert_eq!(first.feature_id, "1");
        assert_eq!(first.index, 1);
        assert_eq!(frame.scroll_limits[&key], 620.0 - 272.0);
    }

    #[test]
    fn test_scroll_beyond_limit_is_clamped() {
        let features: Vec<Feature> = (0..10)
            .map(|i| feature(&i.to_string(), 3.0, 1.0, 100.0 - i as f64))
            .collect();
        let board = organize_quadrants(&features, &StatusFilter::new());
        let mut scroll = ScrollState::new();
        scroll.set(BucketKey::Quadrant(Quadrant::QuickWins), 5000.0, 5000.0);
        let frame = render(&board, ViewMode::Quadrants, &scroll);
        let last = frame.hits.iter().last().unwrap();
        assert_eq!(last.feature_id, "9");
        assert_eq!(last.rect.bottom(), 376.0 - 12.0);
    }

    #[test]
    fn test_scrollbar_only_when_overflowing() {
        let few = organize_quadrants(&[feature("a", 3.0, 1.0, 10.0)], &StatusFilter::new());
        let frame = render(&few, ViewMode::Quadrants, &ScrollState::new());
        let has_bar = |frame: &Frame| {
            frame.commands.iter().any(|c| {
                matches!(c, RenderCommand::FillRect { color, width, .. }
                    if color == theme::shadow::SCROLLBAR && *width == 4.0)
            })
        };
        assert!(!has_bar(&frame));

        let many: Vec<Feature> = (0..10).map(|i| feature(&i.to_string(), 3.0, 1.0, 10.0)).collect();
        let board = organize_quadrants(&many, &StatusFilter::new());
        assert!(has_bar(&render(&board, ViewMode::Quadrants, &ScrollState::new())));
    }

    #[test]
    fn test_row_content() {
        let mut f = feature("a", 3.0, 1.0, 1000.0);
        f.name = "Single sign-on".to_string();
        f.status = FeatureStatus::InProgress;
        f.deadline = chrono::NaiveDate::from_ymd_opt(2026, 6, 30);
        let board = organize_quadrants(&[f], &StatusFilter::new());
        let frame = render(&board, ViewMode::Quadrants, &ScrollState::new());
        let labels = texts(&frame);
        assert!(labels.contains(&"1"));
        assert!(labels.contains(&"In Progress"));
        assert!(labels.contains(&"Single sign-on"));
        assert!(labels.contains(&"2026-06-30"));
        assert!(labels.contains(&"3000.0"));
    }

    #[test]
    fn test_zero_score_shows_na() {
        let board = organize_quadrants(&[feature("a", 3.0, 1.0, 0.0)], &StatusFilter::new());
        let frame = render(&board, ViewMode::Quadrants, &ScrollState::new());
        assert!(texts(&frame).contains(&"N/A"));
    }

    #[test]
    fn test_long_names_are_truncated() {
        let mut f = feature("a", 3.0, 1.0, 10.0);
        f.name = "x".repeat(200);
        let board = organize_quadrants(&[f], &StatusFilter::new());
        let frame = render(&board, ViewMode::Quadrants, &ScrollState::new());
        assert!(texts(&frame).iter().any(|t| t.ends_with("...") && t.len() < 200));
    }

    #[test]
    fn test_rows_are_clipped_to_window() {
        let board = organize_quadrants(&[feature("a", 3.0, 1.0, 10.0)], &StatusFilter::new());
        let frame = render(&board, ViewMode::Quadrants, &ScrollState::new());
        let clip = frame
            .commands
            .iter()
            .position(|c| matches!(c, RenderCommand::ClipRect { .. }))
            .unwrap();
        assert_eq!(frame.commands[clip - 1], RenderCommand::Save);
        assert!(frame.commands[clip..].contains(&RenderCommand::Restore));
    }

    #[test]
    fn test_blocked_mode() {
        let mut blocked = feature("b", 3.0, 1.0, 10.0);
        blocked.is_blocked = true;
        blocked.block_reason = "Waiting on legal".to_string();
        let features = vec![feature("a", 3.0, 1.0, 10.0), blocked];
        let board = organize_quadrants(&features, &StatusFilter::new());
        let frame = render(&board, ViewMode::BlockedOnly, &ScrollState::new());

        assert_eq!(frame.hits.len(), 1);
        let hit = frame.hits.iter().next().unwrap();
        assert_eq!(hit.feature_id, "b");
        assert_eq!(hit.bucket, BucketKey::Blocked);
        assert_eq!(hit.rect, Rect::new(20.0, 100.0, 1160.0, 50.0));

        let labels = texts(&frame);
        assert!(labels.contains(&"Blocked features"));
        assert!(labels.contains(&"Blocked: Waiting on legal"));
        assert!(!labels.contains(&"QUICK WINS"));
        assert_eq!(frame.scroll_limits.keys().collect::<Vec<_>>(), vec![&BucketKey::Blocked]);
    }

    #[test]
    fn test_quadrants_leave_blocked_features_out() {
        let mut blocked = feature("b", 3.0, 1.0, 10.0);
        blocked.is_blocked = true;
        blocked.block_reason = "Waiting on legal".to_string();
        let features = vec![feature("a", 3.0, 1.0, 10.0), blocked];
        let board = organize_quadrants(&features, &StatusFilter::new());
        let frame = render(&board, ViewMode::Quadrants, &ScrollState::new());

        let ids: Vec<&str> = frame.hits.iter().map(|h| h.feature_id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        assert!(!texts(&frame).contains(&LOCK_MARKER));
    }

    #[test]
    fn test_blocked_mode_empty() {
        let frame = render(&QuadrantBoard::default(), ViewMode::BlockedOnly, &ScrollState::new());
        assert!(frame.hits.is_empty());
        assert!(texts(&frame).contains(&"No blocked features"));
    }
}
