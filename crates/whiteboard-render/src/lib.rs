//! Whiteboard render library.
//!
//! Renderer abstraction plus a CPU rasterizer used for the live canvas
//! and PNG export, glyph drawing with a bundled font, and decoding of
//! image sources.

pub mod decode;
pub mod export;
pub mod glyphs;
pub mod raster;
mod renderer;

pub use decode::{decode_data_url, decode_image, load_image_source};
pub use export::{encode_png, render_png};
pub use glyphs::TextRasterizer;
pub use raster::RasterRenderer;
pub use renderer::{
    MAX_SURFACE_SIZE, RenderContext, RenderResult, Renderer, RendererError, check_surface_size,
};
