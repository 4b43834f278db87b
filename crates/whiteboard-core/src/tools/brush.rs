//! Free-drawing brushes (pencil and eraser).

use crate::options::DrawingOptions;
use crate::shapes::{Freehand, SerializableColor, ShapeStyle};
use kurbo::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushKind {
    Pencil,
    Eraser,
}

/// Brush configured on the canvas while a free-drawing mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub kind: BrushKind,
    pub width: u32,
    pub color: SerializableColor,
}

impl Brush {
    pub fn pencil(options: &DrawingOptions) -> Self {
        Self {
            kind: BrushKind::Pencil,
            width: options.brush_width(),
            color: options.color,
        }
    }

    pub fn eraser(options: &DrawingOptions) -> Self {
        Self {
            kind: BrushKind::Eraser,
            width: options.brush_width(),
            color: options.color,
        }
    }

    pub fn is_eraser(&self) -> bool {
        self.kind == BrushKind::Eraser
    }

    /// Begin a stroke at `point`.
    pub fn begin(&self, point: Point) -> BrushStroke {
        BrushStroke {
            brush: *self,
            points: vec![point],
        }
    }
}

/// A stroke in progress. Consecutive duplicate points are collapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushStroke {
    brush: Brush,
    points: Vec<Point>,
}

impl BrushStroke {
    pub fn extend(&mut self, point: Point) {
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    /// The stroke drawn so far, for live display.
    pub fn preview(&self) -> Freehand {
        self.to_freehand(self.points.clone())
    }

    /// Turn the stroke into a scene shape. Strokes with fewer than two
    /// distinct points leave nothing behind.
    pub fn finish(self) -> Option<Freehand> {
        if self.points.len() < 2 {
            return None;
        }
        Some(self.to_freehand(self.points.clone()))
    }

    fn to_freehand(&self, points: Vec<Point>) -> Freehand {
        let mut freehand = Freehand::from_points(points);
        freehand.erasing = self.brush.is_eraser();
        freehand.style = ShapeStyle {
            stroke_color: self.brush.color,
            stroke_width: self.brush.width as f64,
            fill_color: None,
        };
        freehand.selectable = false;
        freehand
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pencil_stroke() {
        let mut options = DrawingOptions::default();
        options.set_color("#123456").unwrap();
        options.set_width(7).unwrap();
        let brush = Brush::pencil(&options);

        let mut stroke = brush.begin(Point::new(0.0, 0.0));
        stroke.extend(Point::new(0.0, 0.0));
        stroke.extend(Point::new(4.0, 2.0));
        assert_eq!(stroke.points().len(), 2);

        let freehand = stroke.finish().unwrap();
        assert!(!freehand.erasing);
        assert!((freehand.style.stroke_width - 7.0).abs() < f64::EPSILON);
        assert_eq!(freehand.style.stroke_color.to_hex(), "#123456");
    }

    #[test]
    fn test_eraser_stroke_marks_erasing() {
        let brush = Brush::eraser(&DrawingOptions::default());
        let mut stroke = brush.begin(Point::ZERO);
        stroke.extend(Point::new(1.0, 1.0));
        assert!(stroke.finish().unwrap().erasing);
    }

    #[test]
    fn test_single_point_stroke_discarded() {
        let brush = Brush::pencil(&DrawingOptions::default());
        let mut stroke = brush.begin(Point::new(3.0, 3.0));
        stroke.extend(Point::new(3.0, 3.0));
        assert!(stroke.finish().is_none());
    }
}
