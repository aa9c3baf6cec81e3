//! Roadmap - feature prioritization on a value/effort matrix.
//!
//! This library provides the core functionality for the `rmap` CLI tool and
//! the browser viewer: RICE scoring, quadrant and kanban organization, the
//! matrix renderer with its interaction model, and feature persistence.

pub mod board;
#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
#[cfg(not(target_arch = "wasm32"))]
pub mod commands;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod gui;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod models;
#[cfg(not(target_arch = "wasm32"))]
pub mod storage;
#[cfg(any(feature = "wasm", test))]
pub mod wasm;

/// Library-level error type for roadmap operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Feature not found: {0}")]
    NotFound(String),

    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for roadmap operations.
pub type Result<T> = std::result::Result<T, Error>;
