//! Visualization of roadmap data
//!
//! Rendering is platform independent: views produce abstract drawing
//! commands which the CLI prints and the WASM viewer replays on a canvas.

/// Shared rendering module for platform-agnostic matrix visualization
pub mod shared;
