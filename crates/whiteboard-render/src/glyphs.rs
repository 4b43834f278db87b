//! Glyph rasterization for text objects.

use crate::raster::blend;
use ab_glyph::{Font, FontRef, GlyphId, PxScale, ScaleFont, point};
use image::RgbaImage;
use kurbo::Affine;
use std::fmt;
use whiteboard_core::shapes::Text;

static DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Draws text with the bundled font.
#[derive(Clone)]
pub struct TextRasterizer {
    font: FontRef<'static>,
}

impl fmt::Debug for TextRasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextRasterizer").finish_non_exhaustive()
    }
}

impl TextRasterizer {
    /// Load the bundled font. `None` if it cannot be parsed.
    pub fn new() -> Option<Self> {
        match FontRef::try_from_slice(DEJAVU_SANS) {
            Ok(font) => Some(Self { font }),
            Err(err) => {
                log::error!("Failed to load bundled font: {err}");
                None
            }
        }
    }

    /// Draw `text` with its top-left at the transformed position. Lines
    /// are `font_size * LINE_HEIGHT` apart.
    pub fn draw(&self, target: &mut RgbaImage, text: &Text, color: [u8; 4], transform: Affine) {
        let zoom = transform.as_coeffs()[0].abs();
        let px = (text.font_size * zoom) as f32;
        if px <= 0.0 || color[3] == 0 {
            return;
        }
        let scaled = self.font.as_scaled(PxScale::from(px));
        let origin = transform * text.position;
        let line_height = (text.font_size * Text::LINE_HEIGHT * zoom) as f32;
        let (width, height) = target.dimensions();

        for (row, line) in text.content().lines().enumerate() {
            let baseline = origin.y as f32 + row as f32 * line_height + scaled.ascent();
            let mut caret = origin.x as f32;
            let mut previous: Option<GlyphId> = None;

            for ch in line.chars() {
                let id = scaled.glyph_id(ch);
                if let Some(prev) = previous {
                    caret += scaled.kern(prev, id);
                }
                let glyph = id.with_scale_and_position(scaled.scale(), point(caret, baseline));
                caret += scaled.h_advance(id);
                previous = Some(id);

                let Some(outlined) = self.font.outline_glyph(glyph) else {
                    // whitespace
                    continue;
                };
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let x = bounds.min.x as i64 + gx as i64;
                    let y = bounds.min.y as i64 + gy as i64;
                    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                        return;
                    }
                    let alpha = (color[3] as f32 * coverage.clamp(0.0, 1.0)).round() as u8;
                    blend(
                        target.get_pixel_mut(x as u32, y as u32),
                        [color[0], color[1], color[2], alpha],
                    );
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use whiteboard_core::shapes::SerializableColor;

    fn inked(image: &RgbaImage) -> Vec<(u32, u32)> {
        image
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[3] > 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_bundled_font_loads() {
        assert!(TextRasterizer::new().is_some());
    }

    #[test]
    fn test_glyphs_land_inside_text_box() {
        let rasterizer = TextRasterizer::new().unwrap();
        let mut target = RgbaImage::new(300, 200);
        let text = Text::new(Point::new(100.0, 100.0), "text".to_string())
            .with_color(SerializableColor::new(0, 0, 255, 255));
        rasterizer.draw(&mut target, &text, [0, 0, 255, 255], Affine::IDENTITY);

        let pixels = inked(&target);
        assert!(pixels.len() > 100);
        assert!(pixels.iter().all(|&(x, y)| x >= 100 && y >= 100 && y < 100 + 47));
        assert!(target.pixels().any(|p| p.0 == [0, 0, 255, 255]));
    }

    #[test]
    fn test_blank_content_draws_nothing() {
        let rasterizer = TextRasterizer::new().unwrap();
        let mut target = RgbaImage::new(100, 100);
        let text = Text::new(Point::new(10.0, 10.0), "   ".to_string());
        rasterizer.draw(&mut target, &text, [0, 0, 0, 255], Affine::IDENTITY);
        assert!(inked(&target).is_empty());
    }

    #[test]
    fn test_second_line_drawn_below_first() {
        let rasterizer = TextRasterizer::new().unwrap();
        let mut target = RgbaImage::new(200, 200);
        let text = Text::new(Point::new(0.0, 0.0), "I\nI".to_string());
        rasterizer.draw(&mut target, &text, [0, 0, 0, 255], Affine::IDENTITY);
        let lowest = inked(&target).iter().map(|&(_, y)| y).max().unwrap();
        // second line baseline sits one line height (46.4px) lower
        assert!(lowest > 60);
    }
}
