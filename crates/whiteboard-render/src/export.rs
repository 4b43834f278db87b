//! PNG export.

use crate::raster::RasterRenderer;
use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError, check_surface_size};
use whiteboard_core::canvas::Canvas;

/// Encode straight-alpha RGBA8 pixels as a PNG file.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    check_surface_size(width, height)?;
    let expected = width as usize * height as usize * 4;
    if rgba_data.len() != expected {
        return Err(RendererError::Encode(format!(
            "expected {expected} bytes of pixel data, got {}",
            rgba_data.len()
        )));
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header().map_err(|e| {
            log::error!("Failed to write PNG header: {:?}", e);
            RendererError::Encode(e.to_string())
        })?;
        writer.write_image_data(rgba_data).map_err(|e| {
            log::error!("Failed to write PNG data: {:?}", e);
            RendererError::Encode(e.to_string())
        })?;
    }

    Ok(png_data)
}

/// Render the canvas at `scale_factor` and encode it as PNG.
///
/// The selection overlay is left out; the export shows the drawing only.
pub fn render_png(canvas: &Canvas, scale_factor: f64) -> RenderResult<Vec<u8>> {
    let ctx = RenderContext::new(canvas)
        .with_scale_factor(scale_factor)
        .with_selection(false);
    let mut renderer = RasterRenderer::new();
    renderer.build_scene(&ctx)?;
    let png = renderer.encode_png()?;
    log::info!(
        "Exported {} shapes as PNG ({} bytes)",
        canvas.scene.len(),
        png.len()
    );
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use whiteboard_core::shapes::{Rectangle, SerializableColor, Shape};
    use whiteboard_core::{Mode, Whiteboard};

    #[test]
    fn test_encode_png_decodes_back() {
        let pixels = [255u8, 0, 0, 255].repeat(6);
        let png = encode_png(&pixels, 3, 2).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_encode_png_rejects_short_buffer() {
        assert!(matches!(
            encode_png(&[0; 8], 2, 2),
            Err(RendererError::Encode(_))
        ));
        assert!(matches!(
            encode_png(&[], 0, 0),
            Err(RendererError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_render_png_matches_canvas() {
        let mut canvas = Canvas::new(80.0, 60.0);
        let mut rect = Rectangle::new(Point::new(10.0, 10.0), 20.0, 20.0);
        rect.style.fill_color = Some(SerializableColor::new(0, 128, 0, 255));
        let shape = Shape::Rectangle(rect);
        let id = shape.id();
        canvas.scene.add_shape(shape);
        canvas.set_active(Some(id));

        let png = render_png(&canvas, 1.0).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (80, 60));
        assert_eq!(decoded.get_pixel(20, 20).0, [0, 128, 0, 255]);
        // No selection handles in exports
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_inserted_text_is_exported() {
        let mut board = Whiteboard::default();
        board.mount(None).unwrap();
        board.set_color("#ff0000").unwrap();
        board.activate(Mode::Text);

        let png = render_png(board.canvas(), 1.0).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        let inked: Vec<_> = decoded
            .pixels()
            .filter(|p| p.0 != [255, 255, 255, 255])
            .collect();
        assert!(inked.len() > 100, "only {} text pixels", inked.len());
        assert!(inked.iter().all(|p| p.0[0] >= 250));
        assert!(inked.iter().any(|p| p.0 == [255, 0, 0, 255]));
    }
}
