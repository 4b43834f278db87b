//! Selection styling, corner handles and the move-drag state.

use crate::shapes::{SerializableColor, Shape, ShapeId};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// How corner handles are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CornerStyle {
    #[default]
    Circle,
    Rect,
}

/// Interaction styling applied when the canvas is set up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionTheme {
    pub corner_style: CornerStyle,
    pub border_color: SerializableColor,
    pub corner_color: SerializableColor,
    /// Handle diameter in pixels.
    pub corner_size: f64,
    /// Gap between the shape bounds and the selection border.
    pub padding: f64,
    /// Dash pattern of the selection border.
    pub border_dash: [f64; 2],
    /// Hollow handles when true.
    pub transparent_corners: bool,
}

impl Default for SelectionTheme {
    fn default() -> Self {
        let accent = SerializableColor::new(0x44, 0x47, 0xa9, 255);
        Self {
            corner_style: CornerStyle::Circle,
            border_color: accent,
            corner_color: accent,
            corner_size: 6.0,
            padding: 10.0,
            border_dash: [5.0, 5.0],
            transparent_corners: false,
        }
    }
}

impl SelectionTheme {
    /// The selection border drawn around `bounds`.
    pub fn border_rect(&self, bounds: Rect) -> Rect {
        bounds.inflate(self.padding, self.padding)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A corner handle of the selection border.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub corner: Corner,
}

impl Handle {
    pub fn new(position: Point, corner: Corner) -> Self {
        Self { position, corner }
    }
}

/// Corner handles of the selection border around `shape`.
pub fn corner_handles(shape: &Shape, theme: &SelectionTheme) -> [Handle; 4] {
    let border = theme.border_rect(shape.bounds());
    [
        Handle::new(Point::new(border.x0, border.y0), Corner::TopLeft),
        Handle::new(Point::new(border.x1, border.y0), Corner::TopRight),
        Handle::new(Point::new(border.x0, border.y1), Corner::BottomLeft),
        Handle::new(Point::new(border.x1, border.y1), Corner::BottomRight),
    ]
}

/// An object being dragged in select mode.
#[derive(Debug, Clone)]
pub struct MoveState {
    pub shape_id: ShapeId,
    pub start_point: Point,
    pub current_point: Point,
    /// Shape as it was when the drag started.
    pub original_shape: Shape,
}

impl MoveState {
    pub fn new(original_shape: Shape, start_point: Point) -> Self {
        Self {
            shape_id: original_shape.id(),
            start_point,
            current_point: start_point,
            original_shape,
        }
    }

    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// The original shape translated by the current drag delta.
    pub fn moved_shape(&self) -> Shape {
        let mut shape = self.original_shape.clone();
        shape.transform(Affine::translate(self.delta()));
        shape
    }
}
