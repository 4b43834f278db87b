//! Triangle shape.

use super::{ShapeId, ShapeStyle, ShapeTrait, default_selectable};
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An isosceles triangle inscribed in its bounding box: apex at the top
/// center, base along the bottom edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub(crate) id: ShapeId,
    /// Top-left corner of the bounding box.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Style properties.
    pub style: ShapeStyle,
    #[serde(default = "default_selectable")]
    pub selectable: bool,
}

impl Triangle {
    /// Create a new triangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            style: ShapeStyle::default(),
            selectable: true,
        }
    }

    /// Replace position and size with the given rect.
    pub fn set_rect(&mut self, rect: Rect) {
        self.position = Point::new(rect.x0, rect.y0);
        self.width = rect.width();
        self.height = rect.height();
    }

    /// Apex, bottom-right and bottom-left vertices.
    pub fn vertices(&self) -> [Point; 3] {
        let Point { x, y } = self.position;
        [
            Point::new(x + self.width / 2.0, y),
            Point::new(x + self.width, y + self.height),
            Point::new(x, y + self.height),
        ]
    }
}

impl ShapeTrait for Triangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    fn to_path(&self) -> BezPath {
        let [apex, right, left] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(apex);
        path.line_to(right);
        path.line_to(left);
        path.close_path();
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
        let scale = affine.as_coeffs();
        self.width *= scale[0].abs();
        self.height *= scale[3].abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices() {
        let tri = Triangle::new(Point::new(0.0, 0.0), 40.0, 30.0);
        let [apex, right, left] = tri.vertices();
        assert_eq!(apex, Point::new(20.0, 0.0));
        assert_eq!(right, Point::new(40.0, 30.0));
        assert_eq!(left, Point::new(0.0, 30.0));
    }

    #[test]
    fn test_path_is_closed_triangle() {
        let tri = Triangle::new(Point::new(5.0, 5.0), 10.0, 10.0);
        let path = tri.to_path();
        // move, two lines, close
        assert_eq!(path.elements().len(), 4);
    }

    #[test]
    fn test_bounds_match_box() {
        let mut tri = Triangle::new(Point::ZERO, 0.0, 0.0);
        tri.set_rect(Rect::new(3.0, 4.0, 13.0, 24.0));
        assert_eq!(tri.bounds(), Rect::new(3.0, 4.0, 13.0, 24.0));
    }
}
