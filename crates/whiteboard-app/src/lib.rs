//! Whiteboard application shell.
//!
//! The browser binding (`WhiteboardWidget`, wasm only) and the native CLI
//! that rasterizes saved scenes.

#[cfg(feature = "native")]
pub mod cli;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WhiteboardWidget;
