//! WASM module for the browser-based roadmap viewer
//!
//! The viewer keeps the feature list in memory, renders the matrix through
//! the shared renderer and hands the resulting commands to JavaScript, which
//! replays them on a canvas and persists the list in local storage.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            JavaScript Layer              │
//! │  - Pointer/wheel events                  │
//! │  - Canvas command replay                 │
//! │  - localStorage persistence              │
//! └────────────────┬─────────────────────────┘
//!                  │ wasm-bindgen
//! ┌────────────────▼─────────────────────────┐
//! │              WASM Module                 │
//! │  - Feature list + view state             │
//! │  - Edits via FeatureCommand              │
//! └────────────────┬─────────────────────────┘
//!                  │
//! ┌────────────────▼─────────────────────────┐
//! │         gui::shared Module               │
//! │  - Matrix renderer, hit regions, scroll  │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! Built with `wasm-pack build --target web -- --features wasm`:
//!
//! ```javascript
//! import init, { RoadmapViewer } from './roadmap.js';
//!
//! await init();
//! const viewer = new RoadmapViewer();
//! viewer.setMeasureText((text, font) => { ctx.font = font; return ctx.measureText(text).width; });
//! viewer.loadFeatures(localStorage.getItem('roadmap_features') ?? '[]');
//! viewer.resize(canvas.clientWidth, canvas.clientHeight, devicePixelRatio);
//! replay(ctx, JSON.parse(viewer.render()));
//! ```

// Bindings module - includes both wasm_bindgen exports for wasm32 and
// the internal structs for testing on all platforms
mod bindings;

// Export bindings on all platforms for testing
pub use bindings::*;

/// Initialize WASM panic hook for better error messages in browser console
#[cfg(target_arch = "wasm32")]
pub fn init_panic_hook() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Version information for the WASM module
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
