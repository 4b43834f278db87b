//! Pointer input events and state.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Move { position: Point },
    Up { position: Point, button: MouseButton },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. } => position,
        }
    }
}

/// Tracks the primary button across events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last pointer position in screen coordinates.
    pub pointer_position: Point,
    /// Where the current press started, while the primary button is down.
    pub drag_start: Option<Point>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event. Returns `false` for events the whiteboard ignores:
    /// secondary buttons, and releases of a press that started elsewhere.
    pub fn handle(&mut self, event: &PointerEvent) -> bool {
        self.pointer_position = event.position();
        match *event {
            PointerEvent::Down { position, button } => {
                if button != MouseButton::Left {
                    return false;
                }
                self.drag_start = Some(position);
            }
            PointerEvent::Move { .. } => {}
            PointerEvent::Up { button, .. } => {
                if button != MouseButton::Left || !self.is_pressed() {
                    return false;
                }
                self.drag_start = None;
            }
        }
        true
    }

    pub fn is_pressed(&self) -> bool {
        self.drag_start.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut input = InputState::new();
        assert!(input.handle(&PointerEvent::Down {
            position: Point::new(3.0, 4.0),
            button: MouseButton::Left,
        }));
        assert!(input.is_pressed());
        assert!(input.handle(&PointerEvent::Move { position: Point::new(9.0, 9.0) }));
        assert_eq!(input.pointer_position, Point::new(9.0, 9.0));
        assert!(input.handle(&PointerEvent::Up {
            position: Point::new(9.0, 9.0),
            button: MouseButton::Left,
        }));
        assert!(!input.is_pressed());
    }

    #[test]
    fn test_secondary_button_ignored() {
        let mut input = InputState::new();
        assert!(!input.handle(&PointerEvent::Down {
            position: Point::ZERO,
            button: MouseButton::Right,
        }));
        assert!(!input.is_pressed());
    }

    #[test]
    fn test_unpaired_release_ignored() {
        let mut input = InputState::new();
        assert!(!input.handle(&PointerEvent::Up {
            position: Point::new(5.0, 5.0),
            button: MouseButton::Left,
        }));
        assert_eq!(input.pointer_position, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_dom_buttons() {
        assert_eq!(MouseButton::from_dom(0), Some(MouseButton::Left));
        assert_eq!(MouseButton::from_dom(2), Some(MouseButton::Right));
        assert_eq!(MouseButton::from_dom(7), None);
    }
}
