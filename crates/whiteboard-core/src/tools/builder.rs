//! Press/move/release construction of line, rectangle, ellipse and triangle
//! shapes.

use crate::options::DrawingOptions;
use crate::shapes::{Ellipse, Line, Rectangle, Shape, ShapeId, Triangle};
use kurbo::{Point, Rect};

/// Shapes that are built by dragging from an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Rectangle,
    Ellipse,
    Triangle,
}

impl ShapeKind {
    /// Create the degenerate shape placed on press.
    fn instantiate(self, anchor: Point, options: &DrawingOptions) -> Shape {
        let mut shape = match self {
            ShapeKind::Line => {
                let mut line = Line::new(anchor, anchor);
                line.style = options.line_style();
                Shape::Line(line)
            }
            ShapeKind::Rectangle => {
                let mut rect = Rectangle::new(anchor, 0.0, 0.0);
                rect.style = options.shape_style();
                Shape::Rectangle(rect)
            }
            ShapeKind::Ellipse => {
                let mut ellipse = Ellipse::new(anchor, 0.0, 0.0);
                ellipse.style = options.shape_style();
                Shape::Ellipse(ellipse)
            }
            ShapeKind::Triangle => {
                let mut triangle = Triangle::new(anchor, 0.0, 0.0);
                triangle.style = options.shape_style();
                Shape::Triangle(triangle)
            }
        };
        shape.set_selectable(false);
        shape
    }
}

/// The rectangle spanning `anchor` and `pointer`, whatever the drag direction.
pub fn span_rect(anchor: Point, pointer: Point) -> Rect {
    Rect::from_points(anchor, pointer)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Provisional {
    anchor: Point,
    id: ShapeId,
}

/// Builder state: idle, or drawing one provisional shape.
#[derive(Debug, Clone, Default)]
pub struct ShapeBuilder {
    provisional: Option<Provisional>,
}

impl ShapeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new shape at `anchor`. Any leftover provisional shape from an
    /// unfinished gesture is forgotten. The returned shape must be added to
    /// the scene by the caller.
    pub fn press(&mut self, kind: ShapeKind, anchor: Point, options: &DrawingOptions) -> Shape {
        let shape = kind.instantiate(anchor, options);
        self.provisional = Some(Provisional {
            anchor,
            id: shape.id(),
        });
        shape
    }

    /// Reshape `shape` so it spans the anchor and `pointer`.
    ///
    /// Returns `false` (and leaves the shape alone) when not drawing or when
    /// `shape` is not the provisional one.
    pub fn drag(&self, pointer: Point, shape: &mut Shape) -> bool {
        let Some(provisional) = self.provisional else {
            return false;
        };
        if shape.id() != provisional.id {
            return false;
        }

        let span = span_rect(provisional.anchor, pointer);
        match shape {
            Shape::Line(line) => line.end = pointer,
            Shape::Rectangle(rect) => rect.set_rect(span),
            Shape::Ellipse(ellipse) => ellipse.set_rect(span),
            Shape::Triangle(triangle) => triangle.set_rect(span),
            _ => return false,
        }
        true
    }

    /// Finish the gesture. The shape stays in the scene as last drawn.
    pub fn release(&mut self) -> Option<ShapeId> {
        self.provisional.take().map(|p| p.id)
    }

    /// Drop the provisional state without a release.
    pub fn cancel(&mut self) {
        self.provisional = None;
    }

    /// Id of the shape currently being drawn.
    pub fn provisional(&self) -> Option<ShapeId> {
        self.provisional.map(|p| p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_with_fill(fill: bool) -> DrawingOptions {
        let mut options = DrawingOptions::default();
        options.set_color("#ff0000").unwrap();
        options.set_width(3).unwrap();
        options.fill = fill;
        options
    }

    #[test]
    fn test_rectangle_reverse_drag() {
        let mut builder = ShapeBuilder::new();
        let options = options_with_fill(false);
        let mut shape = builder.press(ShapeKind::Rectangle, Point::new(100.0, 100.0), &options);
        assert!(builder.drag(Point::new(40.0, 70.0), &mut shape));
        builder.release();

        let Shape::Rectangle(rect) = &shape else {
            panic!("expected rectangle");
        };
        assert_eq!(rect.position, Point::new(40.0, 70.0));
        assert!((rect.width - 60.0).abs() < f64::EPSILON);
        assert!((rect.height - 30.0).abs() < f64::EPSILON);
        assert!(!shape.selectable());
        assert_eq!(shape.style().fill_css(), "transparent");
    }

    #[test]
    fn test_ellipse_radii_and_top_left() {
        let mut builder = ShapeBuilder::new();
        let options = options_with_fill(true);
        let mut shape = builder.press(ShapeKind::Ellipse, Point::new(10.0, 10.0), &options);
        builder.drag(Point::new(50.0, 30.0), &mut shape);

        let Shape::Ellipse(ellipse) = &shape else {
            panic!("expected ellipse");
        };
        assert!((ellipse.radius_x - 20.0).abs() < f64::EPSILON);
        assert!((ellipse.radius_y - 10.0).abs() < f64::EPSILON);
        assert_eq!(ellipse.top_left(), Point::new(10.0, 10.0));
        assert_eq!(shape.style().fill_css(), "#ff0000");
    }

    #[test]
    fn test_triangle_spans_pointer() {
        let mut builder = ShapeBuilder::new();
        let options = options_with_fill(false);
        let mut shape = builder.press(ShapeKind::Triangle, Point::new(50.0, 50.0), &options);
        builder.drag(Point::new(20.0, 90.0), &mut shape);
        assert_eq!(shape.bounds(), Rect::new(20.0, 50.0, 50.0, 90.0));
    }

    #[test]
    fn test_line_anchor_is_fixed() {
        let mut builder = ShapeBuilder::new();
        let options = options_with_fill(true);
        let mut shape = builder.press(ShapeKind::Line, Point::new(5.0, 5.0), &options);
        builder.drag(Point::new(30.0, 10.0), &mut shape);
        builder.drag(Point::new(1.0, 2.0), &mut shape);

        let Shape::Line(line) = &shape else {
            panic!("expected line");
        };
        assert_eq!(line.start, Point::new(5.0, 5.0));
        assert_eq!(line.end, Point::new(1.0, 2.0));
        assert!((line.style.stroke_width - 3.0).abs() < f64::EPSILON);
        assert_eq!(line.style.fill_color, None);
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let builder = ShapeBuilder::new();
        let mut shape = Shape::Rectangle(Rectangle::new(Point::ZERO, 1.0, 1.0));
        let before = shape.clone();
        assert!(!builder.drag(Point::new(50.0, 50.0), &mut shape));
        assert_eq!(shape, before);
    }

    #[test]
    fn test_release_then_move_is_ignored() {
        let mut builder = ShapeBuilder::new();
        let options = DrawingOptions::default();
        let mut shape = builder.press(ShapeKind::Rectangle, Point::ZERO, &options);
        builder.drag(Point::new(10.0, 10.0), &mut shape);
        assert_eq!(builder.release(), Some(shape.id()));
        assert!(!builder.drag(Point::new(99.0, 99.0), &mut shape));
        assert_eq!(shape.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_new_press_replaces_provisional() {
        let mut builder = ShapeBuilder::new();
        let options = DrawingOptions::default();
        let mut first = builder.press(ShapeKind::Rectangle, Point::ZERO, &options);
        let second = builder.press(ShapeKind::Ellipse, Point::new(5.0, 5.0), &options);
        assert_eq!(builder.provisional(), Some(second.id()));
        assert!(!builder.drag(Point::new(20.0, 20.0), &mut first));
    }

    #[test]
    fn test_zero_size_shape_kept() {
        let mut builder = ShapeBuilder::new();
        let options = DrawingOptions::default();
        let shape = builder.press(ShapeKind::Rectangle, Point::new(3.0, 4.0), &options);
        builder.release();
        assert_eq!(shape.bounds(), Rect::new(3.0, 4.0, 3.0, 4.0));
    }
}
