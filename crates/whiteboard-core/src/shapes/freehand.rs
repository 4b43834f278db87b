//! Freehand stroke shape produced by the pencil and eraser brushes.

use super::{ShapeId, ShapeStyle, ShapeTrait, default_selectable};
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand stroke (series of points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ShapeId,
    /// Points in the stroke.
    pub points: Vec<Point>,
    /// Eraser strokes clear what lies beneath them instead of painting.
    #[serde(default)]
    pub erasing: bool,
    /// Style properties.
    pub style: ShapeStyle,
    #[serde(default = "default_selectable")]
    pub selectable: bool,
}

impl Freehand {
    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            erasing: false,
            style: ShapeStyle::default(),
            selectable: true,
        }
    }
}

impl ShapeTrait for Freehand {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(*first, *first), |rect, p| {
            rect.union_pt(*p)
        })
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();

        if let Some((first, rest)) = self.points.split_first() {
            path.move_to(*first);
            for point in rest {
                path.line_to(*point);
            }
        }

        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        for point in &mut self.points {
            *point = affine * *point;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let freehand = Freehand::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
        ]);

        let bounds = freehand.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_bounds() {
        assert_eq!(Freehand::from_points(Vec::new()).bounds(), Rect::ZERO);
    }

    #[test]
    fn test_erasing_defaults_off_when_missing() {
        let stroke = Freehand::from_points(vec![Point::new(1.0, 2.0)]);
        let mut json: serde_json::Value = serde_json::to_value(&stroke).unwrap();
        json.as_object_mut().unwrap().remove("erasing");
        let back: Freehand = serde_json::from_value(json).unwrap();
        assert!(!back.erasing);
    }
}
