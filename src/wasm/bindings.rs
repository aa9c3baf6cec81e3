//! JavaScript bindings for the WASM viewer
//!
//! [`ViewerState`] holds the feature list and the matrix view and compiles on
//! every platform, so the viewer logic is tested natively. The wasm-bindgen
//! class `RoadmapViewer` wraps it on wasm32 builds with the `wasm` feature.

use crate::board::ScoredFeature;
use crate::gui::shared::{
    ApproximateMeasure, Frame, MatrixView, Position, TextMeasure, Tooltip, ViewMode, Viewport,
    delete_feature, drag_start, drop_on_status, toggle_block,
};
use crate::models::{
    DecodedFeatures, Feature, FeatureSink, FeatureStatus, decode_collection, encode_collection,
};

/// Viewer state for the WASM module
#[derive(Debug, Clone)]
pub struct ViewerState {
    /// Features in stored order
    pub features: Vec<Feature>,
    /// Matrix view state (viewport, filter, scroll, last frame)
    pub view: MatrixView,
    /// Stored records that could not be read, written back unchanged
    unreadable: Vec<serde_json::Value>,
    /// Whether the features changed since the last `take_dirty`
    dirty: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerState {
    /// Create an empty viewer state
    pub fn new() -> Self {
        Self {
            features: Vec::new(),
            view: MatrixView::new(Viewport::default()),
            unreadable: Vec::new(),
            dirty: false,
        }
    }

    /// Replace the feature list from stored JSON. Returns the number loaded.
    ///
    /// Content that is not a JSON array loads as an empty list.
    pub fn load_features(&mut self, json: &str) -> usize {
        let decoded = decode_collection(json).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored features are not a JSON array, starting empty");
            DecodedFeatures::default()
        });
        self.features = decoded.features;
        self.unreadable = decoded.unreadable;
        self.dirty = false;
        self.features.len()
    }

    /// The feature list as JSON for persisting
    pub fn features_json(&self) -> String {
        encode_collection(&self.features, &self.unreadable)
            .and_then(|records| Ok(serde_json::to_string(&records)?))
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not encode features");
                "[]".to_string()
            })
    }

    /// Whether the feature list changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) {
        self.view
            .resize(Viewport::new(width, height, device_pixel_ratio));
    }

    /// Switch between the quadrants and the blocked-only list
    pub fn set_show_blocked(&mut self, show: bool) -> bool {
        let mode = if show {
            ViewMode::BlockedOnly
        } else {
            ViewMode::Quadrants
        };
        self.view.set_mode(mode)
    }

    /// Toggle a status in the filter. Unknown status names are ignored.
    pub fn toggle_status_filter(&mut self, status: &str) -> bool {
        match FeatureStatus::parse(status) {
            Some(status) => {
                self.view.toggle_status(status);
                true
            }
            None => false,
        }
    }

    pub fn render(&mut self, measure: &dyn TextMeasure) -> &Frame {
        self.view.render(&self.features, measure)
    }

    /// Render and serialize the drawing commands
    pub fn render_json(&mut self, measure: &dyn TextMeasure) -> String {
        let frame = self.render(measure);
        serde_json::to_string(&frame.commands).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn click(&self, x: f64, y: f64) -> Option<ScoredFeature> {
        self.view.click(Position::new(x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, client_x: f64, client_y: f64) -> Option<&Tooltip> {
        self.view
            .pointer_move(Position::new(x, y), Position::new(client_x, client_y))
    }

    pub fn pointer_leave(&mut self) {
        self.view.pointer_leave();
    }

    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.view.wheel(Position::new(x, y), delta_y)
    }

    fn find(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    /// Drag data for a feature
    pub fn drag_start(&self, id: &str) -> Option<String> {
        self.find(id).map(drag_start)
    }

    /// Apply a drop onto a status column. Returns whether anything changed.
    pub fn drop_on_status(&mut self, data: &str, status: &str) -> bool {
        let Some(target) = FeatureStatus::parse(status) else {
            return false;
        };
        match drop_on_status(data, target) {
            Some(command) => {
                self.apply(command);
                true
            }
            None => false,
        }
    }

    /// Block with `reason`, or unblock an already blocked feature.
    pub fn toggle_block(&mut self, id: &str, reason: Option<String>) -> bool {
        let Some(feature) = self.find(id) else {
            return false;
        };
        let mut prompt = move |_: &Feature| -> Option<String> { reason.clone() };
        match toggle_block(feature, &mut prompt) {
            Some(command) => {
                self.apply(command);
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.features.len();
        self.apply(delete_feature(id));
        self.features.len() != before
    }
}

impl FeatureSink for ViewerState {
    fn update_feature(&mut self, feature: Feature) {
        if let Err(e) = feature.validate() {
            tracing::warn!(error = %e, "update rejected");
            return;
        }
        if let Some(slot) = self.features.iter_mut().find(|f| f.id == feature.id) {
            *slot = feature;
            self.dirty = true;
        }
    }

    fn delete_feature(&mut self, id: &str) {
        let before = self.features.len();
        self.features.retain(|f| f.id != id);
        if self.features.len() != before {
            self.dirty = true;
        }
    }
}

/// Measures text through a JavaScript callback `(text, font) => width`,
/// falling back to an estimate when none is set or it fails.
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
struct JsMeasure<'a> {
    callback: Option<&'a js_sys::Function>,
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
impl TextMeasure for JsMeasure<'_> {
    fn measure_text(&self, text: &str, font: &crate::gui::shared::Font) -> f64 {
        use wasm_bindgen::JsValue;

        self.callback
            .and_then(|f| {
                f.call2(
                    &JsValue::NULL,
                    &JsValue::from_str(text),
                    &JsValue::from_str(&font.css()),
                )
                .ok()
            })
            .and_then(|v| v.as_f64())
            .unwrap_or_else(|| ApproximateMeasure::default().measure_text(text, font))
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod js {
    use super::{JsMeasure, ViewerState};
    use wasm_bindgen::prelude::*;

    /// Roadmap matrix viewer exposed to JavaScript
    #[wasm_bindgen]
    pub struct RoadmapViewer {
        state: ViewerState,
        measure: Option<js_sys::Function>,
    }

    impl Default for RoadmapViewer {
        fn default() -> Self {
            Self::new()
        }
    }

    #[wasm_bindgen]
    impl RoadmapViewer {
        #[wasm_bindgen(constructor)]
        pub fn new() -> Self {
            crate::wasm::init_panic_hook();
            Self {
                state: ViewerState::new(),
                measure: None,
            }
        }

        /// Install the text measuring callback `(text, font) => width`.
        #[wasm_bindgen(js_name = setMeasureText)]
        pub fn set_measure_text(&mut self, callback: js_sys::Function) {
            self.measure = Some(callback);
        }

        #[wasm_bindgen(js_name = loadFeatures)]
        pub fn load_features(&mut self, json: &str) -> usize {
            self.state.load_features(json)
        }

        #[wasm_bindgen(js_name = featuresJson)]
        pub fn features_json(&self) -> String {
            self.state.features_json()
        }

        /// Whether features changed and should be persisted
        #[wasm_bindgen(js_name = takeDirty)]
        pub fn take_dirty(&mut self) -> bool {
            self.state.take_dirty()
        }

        pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) {
            self.state.resize(width, height, device_pixel_ratio);
        }

        #[wasm_bindgen(js_name = setShowBlocked)]
        pub fn set_show_blocked(&mut self, show: bool) -> bool {
            self.state.set_show_blocked(show)
        }

        #[wasm_bindgen(js_name = toggleStatusFilter)]
        pub fn toggle_status_filter(&mut self, status: &str) -> bool {
            self.state.toggle_status_filter(status)
        }

        /// Render a frame; returns the drawing commands as JSON.
        pub fn render(&mut self) -> String {
            let measure = JsMeasure {
                callback: self.measure.as_ref(),
            };
            self.state.render_json(&measure)
        }

        /// The clicked feature as JSON, if any
        pub fn click(&self, x: f64, y: f64) -> Option<String> {
            self.state
                .click(x, y)
                .and_then(|f| serde_json::to_string(&f).ok())
        }

        /// The tooltip as JSON, if the pointer is over a row
        #[wasm_bindgen(js_name = pointerMove)]
        pub fn pointer_move(&mut self, x: f64, y: f64, client_x: f64, client_y: f64) -> Option<String> {
            self.state
                .pointer_move(x, y, client_x, client_y)
                .and_then(|t| serde_json::to_string(t).ok())
        }

        #[wasm_bindgen(js_name = pointerLeave)]
        pub fn pointer_leave(&mut self) {
            self.state.pointer_leave();
        }

        /// Returns whether a redraw is needed
        pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
            self.state.wheel(x, y, delta_y)
        }

        #[wasm_bindgen(js_name = dragStart)]
        pub fn drag_start(&self, id: &str) -> Option<String> {
            self.state.drag_start(id)
        }

        #[wasm_bindgen(js_name = dropOnStatus)]
        pub fn drop_on_status(&mut self, data: &str, status: &str) -> bool {
            self.state.drop_on_status(data, status)
        }

        #[wasm_bindgen(js_name = toggleBlock)]
        pub fn toggle_block(&mut self, id: &str, reason: Option<String>) -> bool {
            self.state.toggle_block(id, reason)
        }

        #[wasm_bindgen(js_name = deleteFeature)]
        pub fn delete_feature(&mut self, id: &str) -> bool {
            self.state.delete(id)
        }
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use js::RoadmapViewer;

#[cfg(test)]
mod tests {
    use super::*;

    const STORED: &str = r#"[
        {"id": 1, "name": "Search", "status": "TODO", "reach": "500", "impact": 3,
         "confidence": 80, "effort": 2, "score": 600, "clickArea": {"x": 1}},
        {"id": "ft-b2c3", "name": "Exports", "status": "DONE", "reach": 100,
         "impact": 1, "confidence": 50, "effort": 5},
        {"id": "ft-c3d4", "name": "SSO", "isBlocked": true, "blockReason": "Legal",
         "impact": 3, "effort": 4}
    ]"#;

    fn loaded() -> ViewerState {
        let mut state = ViewerState::new();
        assert_eq!(state.load_features(STORED), 3);
        state.resize(1200.0, 800.0, 2.0);
        state
    }

    #[test]
    fn test_viewer_state_new() {
        let state = ViewerState::new();
        assert!(state.features.is_empty());
        assert_eq!(state.view.mode(), ViewMode::Quadrants);
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let mut state = loaded();
        assert_eq!(state.load_features("not json"), 0);
        assert!(state.features.is_empty());
    }

    #[test]
    fn test_render_json_and_click() {
        let mut state = loaded();
        let json = state.render_json(&ApproximateMeasure::default());
        let commands: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(commands[0]["op"], "scale");
        assert_eq!(commands[0]["x"], 2.0);

        // Search: impact 3, effort 2 -> quick wins, first row at (24, 104)
        let clicked = state.click(50.0, 120.0).unwrap();
        assert_eq!(clicked.id(), "1");
        assert_eq!(clicked.score, 600.0);
    }

    #[test]
    fn test_blocked_toggle_view() {
        let mut state = loaded();
        assert!(state.set_show_blocked(true));
        state.render(&ApproximateMeasure::default());
        assert_eq!(state.view.frame().hits.len(), 1);
        assert_eq!(state.click(100.0, 120.0).unwrap().id(), "ft-c3d4");
    }

    #[test]
    fn test_status_filter() {
        let mut state = loaded();
        assert!(state.toggle_status_filter("DONE"));
        assert!(!state.toggle_status_filter("ARCHIVED"));
        state.render(&ApproximateMeasure::default());
        let ids: Vec<&str> = state
            .view
            .frame()
            .hits
            .iter()
            .map(|h| h.feature_id.as_str())
            .collect();
        assert_eq!(ids, vec!["ft-b2c3"]);
    }

    #[test]
    fn test_drag_and_drop_marks_dirty() {
        let mut state = loaded();
        let data = state.drag_start("ft-b2c3").unwrap();
        assert!(!state.drop_on_status(&data, "DONE"));
        assert!(!state.take_dirty());

        assert!(state.drop_on_status(&data, "IN_PROGRESS"));
        assert!(state.take_dirty());
        assert_eq!(state.features[1].status, FeatureStatus::InProgress);
        assert!(state.drag_start("missing").is_none());
    }

    #[test]
    fn test_toggle_block_and_delete() {
        let mut state = loaded();
        assert!(!state.toggle_block("1", None));
        assert!(!state.toggle_block("1", Some(" ".to_string())));
        assert!(state.toggle_block("1", Some("Vendor".to_string())));
        assert!(state.features[0].is_blocked);
        assert!(state.toggle_block("1", None));
        assert!(!state.features[0].is_blocked);

        assert!(state.delete("ft-b2c3"));
        assert!(!state.delete("ft-b2c3"));
        assert_eq!(state.features.len(), 2);
    }

    #[test]
    fn test_features_json_round_trip() {
        let mut state = loaded();
        let json = state.features_json();
        let mut other = ViewerState::new();
        assert_eq!(other.load_features(&json), 3);
        assert_eq!(other.features, state.features);
        assert!(!state.take_dirty());
    }

    #[test]
    fn test_features_json_keeps_unreadable_records() {
        let mut state = ViewerState::new();
        let stored = r#"[{"id": "ft-a1b2", "name": "Search", "isBlocked": null}, {"name": "no id"}]"#;
        assert_eq!(state.load_features(stored), 1);
        assert!(state.delete("ft-a1b2"));

        let records: Vec<serde_json::Value> =
            serde_json::from_str(&state.features_json()).unwrap();
        assert_eq!(records, vec![serde_json::json!({"name": "no id"})]);
    }

    #[test]
    fn test_wheel_and_tooltip() {
        let mut state = loaded();
        state.render(&ApproximateMeasure::default());
        assert!(!state.wheel(100.0, 200.0, 100.0));
        let tip = state.pointer_move(50.0, 120.0, 50.0, 120.0).unwrap();
        assert_eq!(tip.feature.id(), "1");
        state.pointer_leave();
        assert!(state.view.tooltip().is_none());
    }
}
