//! Shape definitions for the whiteboard scene.

mod ellipse;
mod freehand;
mod image;
mod line;
mod rectangle;
mod text;
mod triangle;

pub use ellipse::Ellipse;
pub use freehand::Freehand;
pub use image::{Image, ImageFormat};
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::Text;
pub use triangle::Triangle;

use kurbo::{Affine, BezPath, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    ///
    /// The color picker hands out bare hex digits, the scene format keeps the
    /// leading `#`; both are accepted.
    pub fn from_hex(input: &str) -> Option<Self> {
        let hex = input.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b, 255))
            }
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
                Some(Self::new(digit(0)?, digit(1)?, digit(2)?, 255))
            }
            _ => None,
        }
    }

    /// Format as `#rrggbb` (alpha is dropped).
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Keyword used for an absent fill, matching the canvas color vocabulary.
pub const TRANSPARENT: &str = "transparent";

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color (None = transparent).
    pub fill_color: Option<SerializableColor>,
}

impl ShapeStyle {
    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(|c| c.into())
    }

    /// Fill as a CSS-like value: a hex color or `transparent`.
    pub fn fill_css(&self) -> String {
        match self.fill_color {
            Some(color) => color.to_hex(),
            None => TRANSPARENT.to_string(),
        }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 1.0,
            fill_color: None,
        }
    }
}

fn default_selectable() -> bool {
    true
}

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Apply a transform to this shape.
    fn transform(&mut self, affine: Affine);

    /// Check if a point hits this shape.
    ///
    /// Hit testing works on the bounding box, grown by half the stroke width
    /// plus `tolerance`.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let grow = tolerance + self.style().stroke_width / 2.0;
        self.bounds().inflate(grow, grow).contains(point)
    }
}

/// Enum wrapper for all shape types (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Triangle(Triangle),
    Line(Line),
    Freehand(Freehand),
    Text(Text),
    Image(Image),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Shape::Rectangle($s) => $body,
            Shape::Ellipse($s) => $body,
            Shape::Triangle($s) => $body,
            Shape::Line($s) => $body,
            Shape::Freehand($s) => $body,
            Shape::Text($s) => $body,
            Shape::Image($s) => $body,
        }
    };
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        dispatch!(self, s => s.id())
    }

    pub fn bounds(&self) -> Rect {
        dispatch!(self, s => s.bounds())
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        dispatch!(self, s => s.hit_test(point, tolerance))
    }

    pub fn to_path(&self) -> BezPath {
        dispatch!(self, s => s.to_path())
    }

    pub fn style(&self) -> &ShapeStyle {
        dispatch!(self, s => s.style())
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        dispatch!(self, s => s.style_mut())
    }

    pub fn transform(&mut self, affine: Affine) {
        dispatch!(self, s => s.transform(affine))
    }

    /// Whether the shape can be picked in select mode.
    pub fn selectable(&self) -> bool {
        dispatch!(self, s => s.selectable)
    }

    pub fn set_selectable(&mut self, selectable: bool) {
        dispatch!(self, s => s.selectable = selectable)
    }

    /// Short lowercase name of the shape kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Rectangle(_) => "rect",
            Shape::Ellipse(_) => "ellipse",
            Shape::Triangle(_) => "triangle",
            Shape::Line(_) => "line",
            Shape::Freehand(_) => "path",
            Shape::Text(_) => "textbox",
            Shape::Image(_) => "image",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let color = SerializableColor::from_hex("#4447A9").unwrap();
        assert_eq!(color, SerializableColor::new(0x44, 0x47, 0xa9, 255));
        assert_eq!(color.to_hex(), "#4447a9");
    }

    #[test]
    fn test_hex_without_hash_and_short_form() {
        assert_eq!(
            SerializableColor::from_hex("ff0000"),
            Some(SerializableColor::new(255, 0, 0, 255))
        );
        assert_eq!(
            SerializableColor::from_hex("#fff"),
            Some(SerializableColor::white())
        );
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(SerializableColor::from_hex("").is_none());
        assert!(SerializableColor::from_hex("#12345").is_none());
        assert!(SerializableColor::from_hex("#gg0000").is_none());
        assert!(SerializableColor::from_hex("red").is_none());
    }

    #[test]
    fn test_fill_css() {
        let mut style = ShapeStyle::default();
        assert_eq!(style.fill_css(), TRANSPARENT);
        style.fill_color = Some(SerializableColor::new(0, 128, 255, 255));
        assert_eq!(style.fill_css(), "#0080ff");
    }

    #[test]
    fn test_bounding_box_hit_test() {
        let mut rect = Rectangle::new(Point::new(10.0, 10.0), 20.0, 20.0);
        rect.style.stroke_width = 4.0;
        let shape = Shape::Rectangle(rect);
        assert!(shape.hit_test(Point::new(20.0, 20.0), 0.0));
        assert!(shape.hit_test(Point::new(31.5, 20.0), 0.0));
        assert!(!shape.hit_test(Point::new(33.0, 20.0), 0.0));
    }

    #[test]
    fn test_selectable_flag() {
        let mut shape = Shape::Line(Line::new(Point::ZERO, Point::new(5.0, 5.0)));
        assert!(shape.selectable());
        shape.set_selectable(false);
        assert!(!shape.selectable());
    }
}
