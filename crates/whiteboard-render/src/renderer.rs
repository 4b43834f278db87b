//! Renderer trait abstraction.

use kurbo::{Affine, Size};
use peniko::Color;
use thiserror::Error;
use whiteboard_core::canvas::Canvas;
use whiteboard_core::shapes::Shape;

/// Largest surface edge accepted, in pixels.
pub const MAX_SURFACE_SIZE: u32 = 16_384;

/// Renderer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RendererError {
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Check a surface size before allocating pixels for it.
pub fn check_surface_size(width: u32, height: u32) -> RenderResult<()> {
    if width == 0 || height == 0 || width > MAX_SURFACE_SIZE || height > MAX_SURFACE_SIZE {
        return Err(RendererError::InvalidSize { width, height });
    }
    Ok(())
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Surface size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Color under the background image.
    pub background_color: Color,
    /// Draw the selection border around the active object.
    pub show_selection: bool,
    /// Shape drawn on top of the scene without being part of it.
    pub preview: Option<Shape>,
}

impl<'a> RenderContext<'a> {
    /// Create a context covering the whole canvas.
    pub fn new(canvas: &'a Canvas) -> Self {
        Self {
            canvas,
            viewport_size: canvas.size(),
            scale_factor: 1.0,
            background_color: Color::WHITE,
            show_selection: true,
            preview: None,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Toggle the selection overlay (off for exports).
    pub fn with_selection(mut self, show: bool) -> Self {
        self.show_selection = show;
        self
    }

    pub fn with_preview(mut self, preview: Option<Shape>) -> Self {
        self.preview = preview;
        self
    }

    /// Pixel size of the target surface.
    pub fn surface_size(&self) -> (u32, u32) {
        let scale = self.scale_factor.max(0.0);
        (
            (self.viewport_size.width * scale).round() as u32,
            (self.viewport_size.height * scale).round() as u32,
        )
    }

    /// Canvas-to-surface transform.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale_factor) * self.canvas.camera.transform()
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Draw a full frame.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
