//! Pointer and editing interactions
//!
//! [`MatrixView`] owns everything a matrix surface needs between frames
//! (viewport, view mode, filter, scroll offsets, tooltip and the last frame)
//! and turns pointer events into results. Kanban-style actions (drag/drop,
//! block toggling, deletion, edits) are free functions that return
//! [`FeatureCommand`]s for a [`FeatureSink`](crate::models::FeatureSink) to
//! apply; none of them mutate anything themselves.

use super::layout::{MatrixLayout, Position, Viewport, quadrant_at};
use super::matrix::{Frame, MatrixParams, ViewMode, render_matrix};
use super::render::TextMeasure;
use super::scroll::ScrollState;
use crate::board::{BucketKey, QuadrantBoard, ScoredFeature, StatusFilter, organize_quadrants};
use crate::models::{
    DEFAULT_DATE_FORMAT, DragPayload, Feature, FeatureCommand, FeatureStatus, Priority,
    scoring::thresholds,
};
use serde::Serialize;

/// Tooltip size used for clamping it inside the window
pub const TOOLTIP_WIDTH: f64 = 320.0;
pub const TOOLTIP_HEIGHT: f64 = 200.0;
/// Distance between the pointer and the tooltip's top-left corner
pub const TOOLTIP_OFFSET: f64 = 10.0;

/// Hover details for one feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub feature: ScoredFeature,
    pub left: f64,
    pub top: f64,
}

impl Tooltip {
    /// Place a tooltip next to `anchor`, kept inside a `window_width` x
    /// `window_height` window.
    pub fn place(
        feature: ScoredFeature,
        anchor: Position,
        window_width: f64,
        window_height: f64,
    ) -> Self {
        let left = (anchor.x + TOOLTIP_OFFSET)
            .min(window_width - TOOLTIP_WIDTH)
            .max(0.0);
        let top = (anchor.y + TOOLTIP_OFFSET)
            .min(window_height - TOOLTIP_HEIGHT)
            .max(0.0);
        Self { feature, left, top }
    }
}

/// Controller state of a matrix surface.
#[derive(Debug, Clone)]
pub struct MatrixView {
    viewport: Viewport,
    window_width: f64,
    window_height: f64,
    mode: ViewMode,
    filter: StatusFilter,
    layout: MatrixLayout,
    date_format: String,
    scroll: ScrollState,
    tooltip: Option<Tooltip>,
    board: QuadrantBoard,
    frame: Frame,
}

impl MatrixView {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            window_width: viewport.width,
            window_height: viewport.height,
            mode: ViewMode::default(),
            filter: StatusFilter::new(),
            layout: MatrixLayout::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            scroll: ScrollState::new(),
            tooltip: None,
            board: QuadrantBoard::default(),
            frame: Frame::default(),
        }
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    pub fn with_filter(mut self, filter: StatusFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Change the surface size. The tooltip window follows the surface.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.window_width = viewport.width;
        self.window_height = viewport.height;
    }

    /// Size of the window the tooltip must stay inside, when it differs
    /// from the surface.
    pub fn set_window_size(&mut self, width: f64, height: f64) {
        self.window_width = width;
        self.window_height = height;
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch view mode. Returns whether anything changed.
    pub fn set_mode(&mut self, mode: ViewMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.tooltip = None;
        true
    }

    pub fn filter(&self) -> &StatusFilter {
        &self.filter
    }

    pub fn toggle_status(&mut self, status: FeatureStatus) {
        self.filter.toggle(status);
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn board(&self) -> &QuadrantBoard {
        &self.board
    }

    /// The last rendered frame
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Rebuild the board and frame from a snapshot of the features.
    pub fn render(&mut self, features: &[Feature], measure: &dyn TextMeasure) -> &Frame {
        self.board = organize_quadrants(features, &self.filter);
        let params = MatrixParams {
            viewport: self.viewport,
            mode: self.mode,
            scroll: &self.scroll,
            layout: &self.layout,
            date_format: &self.date_format,
        };
        self.frame = render_matrix(&self.board, &params, measure);
        self.scroll.clamp_to(&self.frame.scroll_limits);
        &self.frame
    }

    /// Bucket that receives wheel input at a point
    fn bucket_at(&self, point: Position) -> BucketKey {
        match self.mode {
            ViewMode::Quadrants => BucketKey::Quadrant(quadrant_at(&self.viewport, point)),
            ViewMode::BlockedOnly => BucketKey::Blocked,
        }
    }

    fn max_scroll(&self, bucket: BucketKey) -> f64 {
        self.layout
            .max_scroll(&self.viewport, bucket, self.board.bucket(bucket).len())
    }

    /// Set a bucket's offset directly, clamped against the current board.
    pub fn scroll_to(&mut self, bucket: BucketKey, offset: f64) {
        let max = self.max_scroll(bucket);
        self.scroll.set(bucket, offset, max);
    }

    /// Scroll the bucket under the pointer. Returns whether a redraw is needed.
    pub fn wheel(&mut self, point: Position, delta_y: f64) -> bool {
        let bucket = self.bucket_at(point);
        let max = self.max_scroll(bucket);
        let changed = self.scroll.scroll_by(bucket, delta_y, max);
        if changed {
            tracing::debug!(
                bucket = %bucket,
                offset = self.scroll.offset(bucket),
                "scrolled"
            );
        }
        changed
    }

    /// Resolve a hit region of the last frame to its feature.
    fn feature_at(&self, point: Position) -> Option<&ScoredFeature> {
        let hit = self.frame.hits.hit_test(point)?;
        self.board
            .bucket(hit.bucket)
            .get(hit.index)
            .filter(|item| item.id() == hit.feature_id)
    }

    /// The feature to edit for a click, if the click landed on a row.
    pub fn click(&self, point: Position) -> Option<ScoredFeature> {
        self.feature_at(point).cloned()
    }

    /// Update the tooltip for a pointer at `point` on the surface;
    /// `anchor` is the same pointer in window coordinates.
    pub fn pointer_move(&mut self, point: Position, anchor: Position) -> Option<&Tooltip> {
        self.tooltip = self.feature_at(point).cloned().map(|feature| {
            Tooltip::place(feature, anchor, self.window_width, self.window_height)
        });
        self.tooltip.as_ref()
    }

    pub fn pointer_leave(&mut self) {
        self.tooltip = None;
    }
}

/// Asks the user why a feature is blocked. `None` means cancelled.
pub trait ReasonPrompt {
    fn ask_reason(&mut self, feature: &Feature) -> Option<String>;
}

impl<F> ReasonPrompt for F
where
    F: FnMut(&Feature) -> Option<String>,
{
    fn ask_reason(&mut self, feature: &Feature) -> Option<String> {
        self(feature)
    }
}

/// Block or unblock a feature.
///
/// Unblocking always succeeds and clears the reason. Blocking asks the
/// prompt for a reason and emits nothing when it is cancelled or blank.
pub fn toggle_block(feature: &Feature, prompt: &mut dyn ReasonPrompt) -> Option<FeatureCommand> {
    let mut updated = feature.clone();
    if feature.is_blocked {
        updated.is_blocked = false;
        updated.block_reason.clear();
        return Some(FeatureCommand::Update(updated));
    }

    let reason = prompt.ask_reason(feature)?;
    let reason = reason.trim();
    if reason.is_empty() {
        return None;
    }
    updated.is_blocked = true;
    updated.block_reason = reason.to_string();
    Some(FeatureCommand::Update(updated))
}

/// Serialize a feature as drag data.
pub fn drag_start(feature: &Feature) -> String {
    DragPayload::new(feature).to_json()
}

/// Resolve a drop onto a status column.
///
/// Emits an update with only the status replaced, or nothing when the status
/// is unchanged or the payload cannot be read.
pub fn drop_on_status(data: &str, target: FeatureStatus) -> Option<FeatureCommand> {
    let payload = match DragPayload::from_json(data) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed drag payload");
            return None;
        }
    };
    let mut feature = payload.feature;
    if feature.status == target {
        return None;
    }
    feature.status = target;
    Some(FeatureCommand::Update(feature))
}

pub fn delete_feature(id: &str) -> FeatureCommand {
    FeatureCommand::Delete(id.to_string())
}

/// Turn an edited copy into an update for the original record.
pub fn apply_edit(original: &Feature, mut edited: Feature) -> FeatureCommand {
    edited.id = original.id.clone();
    if edited.priority.is_none() {
        edited.priority = Some(Priority::Medium);
    }
    if edited.effort.is_nan() || edited.effort < thresholds::MIN_EFFORT {
        edited.effort = thresholds::MIN_EFFORT;
    }
    FeatureCommand::Update(edited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::shared::render::ApproximateMeasure;
    use crate::models::{FeatureSink, Quadrant};

    fn feature(id: &str, impact: f64, effort: f64, reach: f64) -> Feature {
        let mut f = Feature::new(id, format!("Feature {}", id));
        f.impact = impact;
        f.effort = effort;
        f.reach = reach;
        f.confidence = 100.0;
        f
    }

    fn many(count: usize) -> Vec<Feature> {
        (0..count)
            .map(|i| feature(&i.to_string(), 3.0, 1.0, 1000.0 - i as f64))
            .collect()
    }

    fn view() -> MatrixView {
        MatrixView::new(Viewport::new(1200.0, 800.0, 1.0))
    }

    #[test]
    fn test_click_resolves_row() {
        let features = many(3);
        let mut view = view();
        view.render(&features, &ApproximateMeasure::default());
        let hit = view.click(Position::new(50.0, 110.0)).unwrap();
        assert_eq!(hit.id(), "0");
        assert_eq!(hit.score, features[0].raw_score());
        assert!(view.click(Position::new(50.0, 50.0)).is_none());
        assert!(view.click(Position::new(1100.0, 700.0)).is_none());
    }

    #[test]
    fn test_wheel_clamps_for_any_sequence() {
        let features = many(12);
        let mut view = view();
        view.render(&features, &ApproximateMeasure::default());
        let key = BucketKey::Quadrant(Quadrant::QuickWins);
        let max = 12.0 * 62.0 - 272.0;
        let pointer = Position::new(100.0, 200.0);

        for delta in [100.0, 5000.0, -30.0, -10000.0, 250.0, f64::NAN, 1e9] {
            view.wheel(pointer, delta);
            let offset = view.scroll().offset(key);
            assert!((0.0..=max).contains(&offset), "offset {} out of range", offset);
        }
        assert_eq!(view.scroll().offset(key), max);
    }

    #[test]
    fn test_wheel_without_overflow_needs_no_redraw() {
        let mut view = view();
        view.render(&many(2), &ApproximateMeasure::default());
        assert!(!view.wheel(Position::new(100.0, 200.0), 120.0));
    }

    #[test]
    fn test_wheel_routes_to_quadrant_under_pointer() {
        let mut view = view();
        view.render(&many(12), &ApproximateMeasure::default());
        assert!(!view.wheel(Position::new(900.0, 200.0), 120.0));
        assert!(view.wheel(Position::new(100.0, 200.0), 120.0));
        assert_eq!(
            view.scroll().offset(BucketKey::Quadrant(Quadrant::HighValue)),
            0.0
        );
    }

    #[test]
    fn test_scroll_is_reclamped_when_data_shrinks() {
        let mut view = view();
        view.render(&many(12), &ApproximateMeasure::default());
        view.wheel(Position::new(100.0, 200.0), 1000.0);
        view.render(&many(5), &ApproximateMeasure::default());
        let key = BucketKey::Quadrant(Quadrant::QuickWins);
        assert_eq!(view.scroll().offset(key), 5.0 * 62.0 - 272.0);
    }

    #[test]
    fn test_blocked_mode_wheel_targets_blocked_list() {
        let features: Vec<Feature> = many(20)
            .into_iter()
            .map(|mut f| {
                f.is_blocked = true;
                f.block_reason = "vendor".to_string();
                f
            })
            .collect();
        let mut view = view();
        assert!(view.set_mode(ViewMode::BlockedOnly));
        assert!(!view.set_mode(ViewMode::BlockedOnly));
        view.render(&features, &ApproximateMeasure::default());
        assert!(view.wheel(Position::new(900.0, 700.0), 62.0));
        assert_eq!(view.scroll().offset(BucketKey::Blocked), 62.0);
    }

    #[test]
    fn test_status_filter_applies_to_render() {
        let mut features = many(2);
        features[1].status = FeatureStatus::Done;
        let mut view = view();
        view.toggle_status(FeatureStatus::Done);
        view.render(&features, &ApproximateMeasure::default());
        assert_eq!(view.frame().hits.len(), 1);
        assert_eq!(view.board().quick_wins[0].id(), "1");
    }

    #[test]
    fn test_tooltip_follows_pointer_and_clamps() {
        let mut view = view();
        view.render(&many(1), &ApproximateMeasure::default());

        let tip = view
            .pointer_move(Position::new(50.0, 110.0), Position::new(50.0, 110.0))
            .unwrap();
        assert_eq!((tip.left, tip.top), (60.0, 120.0));

        view.set_window_size(300.0, 150.0);
        let tip = view
            .pointer_move(Position::new(50.0, 110.0), Position::new(290.0, 140.0))
            .unwrap();
        assert_eq!((tip.left, tip.top), (0.0, 0.0));

        assert!(
            view.pointer_move(Position::new(50.0, 50.0), Position::new(50.0, 50.0))
                .is_none()
        );
        view.pointer_move(Position::new(50.0, 110.0), Position::new(50.0, 110.0));
        view.pointer_leave();
        assert!(view.tooltip().is_none());
    }

    #[test]
    fn test_tooltip_place_near_right_edge() {
        let tip = Tooltip::place(
            ScoredFeature::new(&feature("a", 1.0, 1.0, 1.0)),
            Position::new(1000.0, 700.0),
            1200.0,
            800.0,
        );
        assert_eq!(tip.left, 880.0);
        assert_eq!(tip.top, 600.0);
    }

    #[test]
    fn test_block_requires_reason() {
        let f = feature("a", 1.0, 1.0, 1.0);
        assert!(toggle_block(&f, &mut |_: &Feature| -> Option<String> { None }).is_none());
        assert!(toggle_block(&f, &mut |_: &Feature| -> Option<String> {
            Some("   ".to_string())
        }).is_none());

        let command = toggle_block(&f, &mut |_: &Feature| -> Option<String> {
            Some("Waiting on API".to_string())
        });
        match command {
            Some(FeatureCommand::Update(updated)) => {
                assert!(updated.is_blocked);
                assert_eq!(updated.block_reason, "Waiting on API");
                assert_eq!(updated.id, "a");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unblock_clears_reason_without_prompting() {
        let mut f = feature("a", 1.0, 1.0, 1.0);
        f.is_blocked = true;
        f.block_reason = "legal".to_string();
        let mut asked = false;
        let command = toggle_block(&f, &mut |_: &Feature| -> Option<String> {
            asked = true;
            None
        });
        assert!(!asked);
        match command {
            Some(FeatureCommand::Update(updated)) => {
                assert!(!updated.is_blocked);
                assert!(updated.block_reason.is_empty());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_drop_on_same_status_is_noop() {
        let f = feature("a", 1.0, 1.0, 1.0);
        let data = drag_start(&f);
        assert!(drop_on_status(&data, FeatureStatus::Backlog).is_none());
    }

    #[test]
    fn test_drop_changes_only_status() {
        let mut f = feature("a", 2.0, 3.0, 40.0);
        f.deadline = chrono::NaiveDate::from_ymd_opt(2026, 2, 1);
        let data = drag_start(&f);
        match drop_on_status(&data, FeatureStatus::Done) {
            Some(FeatureCommand::Update(updated)) => {
                let mut expected = f.clone();
                expected.status = FeatureStatus::Done;
                assert_eq!(updated, expected);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_drop_malformed_payload() {
        assert!(drop_on_status("not json", FeatureStatus::Done).is_none());
        assert!(drop_on_status("{\"name\": 1}", FeatureStatus::Done).is_none());
    }

    #[test]
    fn test_apply_edit() {
        let original = feature("ft-1234", 1.0, 1.0, 1.0);
        let mut edited = feature("other", 2.0, 0.0, 5.0);
        edited.priority = None;
        match apply_edit(&original, edited) {
            FeatureCommand::Update(updated) => {
                assert_eq!(updated.id, "ft-1234");
                assert_eq!(updated.priority, Some(Priority::Medium));
                assert_eq!(updated.effort, 1.0);
                assert_eq!(updated.reach, 5.0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[derive(Default)]
    struct Recorder {
        updated: Vec<String>,
        deleted: Vec<String>,
    }

    impl FeatureSink for Recorder {
        fn update_feature(&mut self, feature: Feature) {
            self.updated.push(feature.id);
        }

        fn delete_feature(&mut self, id: &str) {
            self.deleted.push(id.to_string());
        }
    }

    #[test]
    fn test_commands_reach_sink() {
        let mut sink = Recorder::default();
        sink.apply(delete_feature("ft-9"));
        let f = feature("a", 1.0, 1.0, 1.0);
        if let Some(command) = drop_on_status(&drag_start(&f), FeatureStatus::Todo) {
            sink.apply(command);
        }
        assert_eq!(sink.deleted, vec!["ft-9"]);
        assert_eq!(sink.updated, vec!["a"]);
    }
}
