//! View transform between pointer (screen) coordinates and canvas coordinates.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Camera manages the view transform for the canvas.
///
/// The whiteboard draws at 1:1 by default; `offset` accounts for the canvas
/// element's position inside the page and any panning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan)
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%)
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World-to-screen transform, used when rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen-to-world transform, used for input.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let camera = Camera::new();
        let screen = Point::new(100.0, 200.0);
        assert_eq!(camera.screen_to_world(screen), screen);
    }

    #[test]
    fn test_screen_to_world_with_offset() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        let world = camera.screen_to_world(Point::new(150.0, 300.0));
        assert!((world.x - 100.0).abs() < 1e-9);
        assert!((world.y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_transforms_are_inverse() {
        let camera = Camera {
            offset: Vec2::new(-20.0, 35.0),
            zoom: 2.0,
        };
        let world = Point::new(12.5, -7.0);
        let back = camera.screen_to_world(camera.transform() * world);
        assert!((back.x - world.x).abs() < 1e-9);
        assert!((back.y - world.y).abs() < 1e-9);
    }
}
