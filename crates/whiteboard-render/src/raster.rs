//! CPU rasterizer.
//!
//! Paths are flattened to line segments and filled scanline by scanline
//! with the nonzero rule, sampling pixel centres. Strokes are turned into
//! fill outlines by kurbo's stroker first. No anti-aliasing.

use crate::export::encode_png;
use crate::glyphs::TextRasterizer;
use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError, check_surface_size};
use image::{Rgba, RgbaImage, imageops};
use kurbo::{
    Affine, BezPath, Cap, Circle, Join, PathEl, Point, Rect, Shape as KurboShape, Stroke,
    StrokeOpts,
};
use peniko::Color;
use std::collections::HashMap;
use std::sync::Arc;
use whiteboard_core::selection::{CornerStyle, SelectionTheme, corner_handles};
use whiteboard_core::shapes::{Image, Shape, ShapeId, ShapeTrait};

/// Flattening tolerance in surface pixels.
const TOLERANCE: f64 = 0.1;

/// Placeholder color for images that cannot be decoded.
const PLACEHOLDER: [u8; 4] = [200, 200, 200, 255];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Paint {
    /// Blend the color over the target (source-over).
    Color([u8; 4]),
    /// Set covered pixels to fully transparent.
    Clear,
}

fn rgba(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

/// Renders a canvas into an RGBA pixmap.
#[derive(Debug)]
pub struct RasterRenderer {
    pixmap: Option<RgbaImage>,
    /// Decoded image pixels by shape, `None` when decoding failed.
    image_cache: HashMap<ShapeId, Option<Arc<RgbaImage>>>,
    /// `None` when the bundled font failed to load; text is then skipped.
    text: Option<TextRasterizer>,
}

impl Default for RasterRenderer {
    fn default() -> Self {
        Self {
            pixmap: None,
            image_cache: HashMap::new(),
            text: TextRasterizer::new(),
        }
    }
}

impl RasterRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last rendered frame.
    pub fn pixmap(&self) -> Option<&RgbaImage> {
        self.pixmap.as_ref()
    }

    /// Encode the last rendered frame as PNG.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        match &self.pixmap {
            Some(pixmap) => encode_png(pixmap.as_raw(), pixmap.width(), pixmap.height()),
            None => Err(RendererError::InvalidSize { width: 0, height: 0 }),
        }
    }

    fn decoded(&mut self, image: &Image) -> Option<Arc<RgbaImage>> {
        self.image_cache
            .entry(image.id())
            .or_insert_with(|| {
                let bytes = image.data()?;
                match ::image::load_from_memory(&bytes) {
                    Ok(decoded) => Some(Arc::new(decoded.to_rgba8())),
                    Err(err) => {
                        log::warn!("Failed to decode image {}: {err}", image.id());
                        None
                    }
                }
            })
            .clone()
    }

    /// Drop cached pixels of images that left the scene.
    fn prune_cache(&mut self, ctx: &RenderContext) {
        let scene = &ctx.canvas.scene;
        let background = scene.background.as_ref().map(|bg| bg.id());
        self.image_cache
            .retain(|id, _| scene.get_shape(*id).is_some() || background == Some(*id));
    }

    fn render_image(&mut self, target: &mut RgbaImage, image: &Image, transform: Affine) {
        let dest = transform.transform_rect_bbox(image.as_rect());
        match self.decoded(image) {
            Some(pixels) => draw_image(target, &pixels, dest),
            None => fill_path(target, &dest.to_path(TOLERANCE), Paint::Color(PLACEHOLDER)),
        }
    }

    fn render_shape(&mut self, target: &mut RgbaImage, shape: &Shape, transform: Affine) {
        let scale = transform.as_coeffs()[0].abs();
        let style = shape.style();
        match shape {
            Shape::Image(image) => self.render_image(target, image, transform),
            Shape::Text(text) => {
                if let (Some(rasterizer), Some(fill)) = (&self.text, style.fill()) {
                    rasterizer.draw(target, text, rgba(fill), transform);
                }
            }
            Shape::Freehand(stroke) => {
                let paint = if stroke.erasing {
                    Paint::Clear
                } else {
                    Paint::Color(rgba(style.stroke()))
                };
                let mut path = shape.to_path();
                path.apply_affine(transform);
                stroke_path(target, &path, style.stroke_width * scale, true, None, paint);
            }
            _ => {
                let mut path = shape.to_path();
                path.apply_affine(transform);
                if let Some(fill) = style.fill() {
                    fill_path(target, &path, Paint::Color(rgba(fill)));
                }
                stroke_path(
                    target,
                    &path,
                    style.stroke_width * scale,
                    false,
                    None,
                    Paint::Color(rgba(style.stroke())),
                );
            }
        }
    }
}

impl Renderer for RasterRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let (width, height) = ctx.surface_size();
        check_surface_size(width, height)?;
        self.prune_cache(ctx);

        let transform = ctx.transform();
        let scene = &ctx.canvas.scene;
        let background_color = Rgba(rgba(self.background_color(ctx)));
        let mut surface = RgbaImage::from_pixel(width, height, background_color);

        if let Some(background) = &scene.background {
            self.render_image(&mut surface, background, transform);
        }

        // Shapes go on their own layer so eraser strokes never cut into
        // the background
        let mut layer = RgbaImage::new(width, height);
        for shape in scene.shapes_ordered() {
            self.render_shape(&mut layer, shape, transform);
        }
        if let Some(preview) = &ctx.preview {
            self.render_shape(&mut layer, preview, transform);
        }
        imageops::overlay(&mut surface, &layer, 0, 0);

        if ctx.show_selection {
            if let Some(active) = ctx.canvas.active_shape() {
                render_selection(&mut surface, active, &ctx.canvas.theme, transform);
            }
        }

        log::trace!("rendered {} shapes at {width}x{height}", scene.len());
        self.pixmap = Some(surface);
        Ok(())
    }
}

/// Dashed border and corner handles around the active object.
fn render_selection(
    target: &mut RgbaImage,
    shape: &Shape,
    theme: &SelectionTheme,
    transform: Affine,
) {
    let border = transform.transform_rect_bbox(theme.border_rect(shape.bounds()));
    stroke_path(
        target,
        &border.to_path(TOLERANCE),
        1.0,
        false,
        Some(theme.border_dash),
        Paint::Color(rgba(theme.border_color.into())),
    );

    let corner_paint = Paint::Color(rgba(theme.corner_color.into()));
    let radius = theme.corner_size / 2.0;
    for handle in corner_handles(shape, theme) {
        let center = transform * handle.position;
        let handle = match theme.corner_style {
            CornerStyle::Circle => Circle::new(center, radius).to_path(TOLERANCE),
            CornerStyle::Rect => {
                let size = (theme.corner_size, theme.corner_size);
                Rect::from_center_size(center, size).to_path(TOLERANCE)
            }
        };
        if theme.transparent_corners {
            stroke_path(target, &handle, 1.0, false, None, corner_paint);
        } else {
            fill_path(target, &handle, corner_paint);
        }
    }
}

/// A non-horizontal polygon edge, stored top to bottom.
#[derive(Debug, Clone, Copy)]
struct Edge {
    top: Point,
    bottom: Point,
    winding: i32,
}

impl Edge {
    fn new(a: Point, b: Point) -> Option<Self> {
        if a.y == b.y {
            return None;
        }
        Some(if a.y < b.y {
            Edge { top: a, bottom: b, winding: 1 }
        } else {
            Edge { top: b, bottom: a, winding: -1 }
        })
    }

    /// X where the edge crosses the horizontal line `y`, if it does.
    fn crossing(&self, y: f64) -> Option<f64> {
        if y < self.top.y || y >= self.bottom.y {
            return None;
        }
        let t = (y - self.top.y) / (self.bottom.y - self.top.y);
        Some(self.top.x + t * (self.bottom.x - self.top.x))
    }
}

/// Flatten `path` into edges; every subpath is implicitly closed.
fn flatten_edges(path: &BezPath) -> Vec<Edge> {
    let mut edges = Vec::new();
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;
    kurbo::flatten(path.iter(), TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            edges.extend(Edge::new(current, start));
            start = p;
            current = p;
        }
        PathEl::LineTo(p) => {
            edges.extend(Edge::new(current, p));
            current = p;
        }
        PathEl::ClosePath => {
            edges.extend(Edge::new(current, start));
            current = start;
        }
        // flatten only emits lines
        _ => {}
    });
    edges.extend(Edge::new(current, start));
    edges
}

fn fill_path(target: &mut RgbaImage, path: &BezPath, paint: Paint) {
    let edges = flatten_edges(path);
    if edges.is_empty() {
        return;
    }
    let (width, height) = target.dimensions();
    let bounds = path.bounding_box();
    let row_start = bounds.y0.floor().max(0.0) as u32;
    let row_end = (bounds.y1.ceil().max(0.0) as u32).min(height);

    let mut crossings: Vec<(f64, i32)> = Vec::with_capacity(edges.len());
    for y in row_start..row_end {
        let center = y as f64 + 0.5;
        crossings.clear();
        crossings.extend(
            edges
                .iter()
                .filter_map(|edge| edge.crossing(center).map(|x| (x, edge.winding))),
        );
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0;
        for pair in crossings.windows(2) {
            winding += pair[0].1;
            if winding != 0 {
                fill_span(target, y, pair[0].0, pair[1].0, width, paint);
            }
        }
    }
}

/// Paint the pixels of row `y` whose centres lie in `[x_start, x_end)`.
fn fill_span(
    target: &mut RgbaImage,
    y: u32,
    x_start: f64,
    x_end: f64,
    width: u32,
    paint: Paint,
) {
    let first = (x_start - 0.5).ceil().max(0.0) as u32;
    let last = ((x_end - 0.5).ceil().max(0.0) as u32).min(width);
    for x in first..last {
        let pixel = target.get_pixel_mut(x, y);
        match paint {
            Paint::Color(color) => blend(pixel, color),
            Paint::Clear => *pixel = Rgba([0, 0, 0, 0]),
        }
    }
}

fn stroke_path(
    target: &mut RgbaImage,
    path: &BezPath,
    width: f64,
    round: bool,
    dashes: Option<[f64; 2]>,
    paint: Paint,
) {
    if width <= 0.0 {
        return;
    }
    let mut style = if round {
        Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round)
    } else {
        Stroke::new(width).with_caps(Cap::Butt).with_join(Join::Miter)
    };
    if let Some(pattern) = dashes {
        style = style.with_dashes(0.0, pattern);
    }
    let outline = kurbo::stroke(path.iter(), &style, &StrokeOpts::default(), TOLERANCE);
    fill_path(target, &outline, paint);
}

/// Source-over blend of a straight-alpha color.
pub(crate) fn blend(dst: &mut Rgba<u8>, src: [u8; 4]) {
    let src_a = src[3] as f32 / 255.0;
    if src_a <= 0.0 {
        return;
    }
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    for i in 0..3 {
        let value = (src[i] as f32 * src_a + dst[i] as f32 * dst_a * (1.0 - src_a)) / out_a;
        dst[i] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

/// Nearest-neighbour copy of `source` into the surface rect `dest`.
fn draw_image(target: &mut RgbaImage, source: &RgbaImage, dest: Rect) {
    let (width, height) = target.dimensions();
    let (src_w, src_h) = source.dimensions();
    if src_w == 0 || src_h == 0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
        return;
    }
    let x_first = (dest.x0 - 0.5).ceil().max(0.0) as u32;
    let x_last = ((dest.x1 - 0.5).ceil().max(0.0) as u32).min(width);
    let y_first = (dest.y0 - 0.5).ceil().max(0.0) as u32;
    let y_last = ((dest.y1 - 0.5).ceil().max(0.0) as u32).min(height);

    for y in y_first..y_last {
        let v = ((y as f64 + 0.5 - dest.y0) / dest.height() * src_h as f64) as u32;
        for x in x_first..x_last {
            let u = ((x as f64 + 0.5 - dest.x0) / dest.width() * src_w as f64) as u32;
            let texel = source.get_pixel(u.min(src_w - 1), v.min(src_h - 1));
            blend(target.get_pixel_mut(x, y), texel.0);
        }
    }
}
