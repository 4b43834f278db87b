//! Text shape.

use super::{SerializableColor, ShapeId, ShapeStyle, ShapeTrait, default_selectable};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An editable block of text. The text color is the style's fill color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Position (top-left corner of the text box).
    pub position: Point,
    /// The text content.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Whether the content can be edited in place.
    #[serde(default = "default_editable")]
    pub editable: bool,
    /// Style properties.
    pub style: ShapeStyle,
    #[serde(default = "default_selectable")]
    pub selectable: bool,
}

fn default_editable() -> bool {
    true
}

impl Text {
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 40.0;
    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.16;
    /// Average glyph advance as a multiple of the font size.
    const CHAR_WIDTH_FACTOR: f64 = 0.55;

    /// Create a new text shape.
    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            editable: true,
            style: ShapeStyle {
                stroke_width: 0.0,
                fill_color: Some(SerializableColor::black()),
                ..ShapeStyle::default()
            },
            selectable: true,
        }
    }

    /// Set the text color.
    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.style.fill_color = Some(color);
        self
    }

    /// Set the text content.
    pub fn set_content(&mut self, content: String) {
        self.content = content;
    }

    /// Get the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Approximate width based on the longest line; actual width depends on
    /// the font.
    fn approximate_width(&self) -> f64 {
        let max_line_len = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        max_line_len as f64 * self.font_size * Self::CHAR_WIDTH_FACTOR
    }

    fn approximate_height(&self) -> f64 {
        let lines = self.content.lines().count().max(1);
        lines as f64 * self.font_size * Self::LINE_HEIGHT
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.approximate_width(),
            self.position.y + self.approximate_height(),
        )
    }

    fn to_path(&self) -> BezPath {
        // Glyph outlines are the renderer's business; the box stands in
        self.bounds().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_defaults() {
        let text = Text::new(Point::new(100.0, 100.0), "text".to_string());
        assert!(text.editable);
        assert!((text.font_size - Text::DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
        assert_eq!(text.style.fill_color, Some(SerializableColor::black()));
    }

    #[test]
    fn test_bounds_grow_with_content() {
        let mut text = Text::new(Point::ZERO, "ab".to_string());
        let narrow = text.bounds().width();
        text.set_content("abcd\nx".to_string());
        assert!(text.bounds().width() > narrow);
        assert!((text.bounds().height() - 2.0 * 40.0 * Text::LINE_HEIGHT).abs() < 1e-9);
    }

    #[test]
    fn test_with_color() {
        let red = SerializableColor::new(255, 0, 0, 255);
        let text = Text::new(Point::ZERO, "hi".to_string()).with_color(red);
        assert_eq!(text.style.fill_color, Some(red));
    }
}
