//! Shared rendering module for the roadmap views
//!
//! This module contains platform-agnostic rendering logic shared by the
//! command line (which prints frames as JSON) and the WASM viewer (which
//! replays them on a canvas).
//!
//! # Modules
//!
//! - `theme`: Quadrant and status colors as Rust constants
//! - `layout`: Quadrant grid, list windows and row geometry
//! - `render`: Abstract rendering commands and text measurement
//! - `hit_test`: Per-frame clickable row regions
//! - `scroll`: Per-bucket scroll offsets
//! - `matrix`: The value/effort matrix renderer
//! - `interaction`: Pointer handling and feature editing actions

pub mod interaction;
pub mod layout;
pub mod matrix;
pub mod render;
pub mod scroll;
pub mod theme;

pub use hit_test::*;
pub use interaction::*;
pub use layout::*;
pub use matrix::*;
pub use render::*;
pub use scroll::*;
pub use theme::*;
