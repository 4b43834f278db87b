//! Drawing modes and the mode controller.
//!
//! The controller is a small state machine with a single transition
//! function, [`ModeController::activate`]. Entering a mode yields a
//! [`ModeEntry`] that declares everything the mode needs: the pointer
//! bindings, an optional free-drawing brush and the canvas flags. The
//! previous bindings are always revoked before the new ones are installed.

mod brush;
mod builder;

pub use brush::{Brush, BrushKind, BrushStroke};
pub use builder::{ShapeBuilder, ShapeKind};

use crate::canvas::HoverCursor;
use crate::options::DrawingOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The selected drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    #[default]
    None,
    Rectangle,
    Ellipse,
    Triangle,
    Line,
    Pencil,
    Eraser,
    Text,
    Select,
}

impl Mode {
    /// All modes, in toolbar order.
    pub const ALL: [Mode; 9] = [
        Mode::None,
        Mode::Line,
        Mode::Rectangle,
        Mode::Ellipse,
        Mode::Triangle,
        Mode::Pencil,
        Mode::Text,
        Mode::Select,
        Mode::Eraser,
    ];

    /// Upper-case name as used in the toolbar protocol.
    pub fn name(self) -> &'static str {
        match self {
            Mode::None => "NONE",
            Mode::Rectangle => "RECTANGLE",
            Mode::Ellipse => "ELLIPSE",
            Mode::Triangle => "TRIANGLE",
            Mode::Line => "LINE",
            Mode::Pencil => "PENCIL",
            Mode::Eraser => "ERASER",
            Mode::Text => "TEXT",
            Mode::Select => "SELECT",
        }
    }

    /// The shape builder this mode drives, if any.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            Mode::Rectangle => Some(ShapeKind::Rectangle),
            Mode::Ellipse => Some(ShapeKind::Ellipse),
            Mode::Triangle => Some(ShapeKind::Triangle),
            Mode::Line => Some(ShapeKind::Line),
            _ => None,
        }
    }

    /// Entry action of this mode.
    ///
    /// Text has no resting state and is handled by the controller directly.
    pub fn entry(self, options: &DrawingOptions) -> ModeEntry {
        let select = self == Mode::Select;
        let (bindings, brush) = match self {
            Mode::Rectangle | Mode::Ellipse | Mode::Triangle | Mode::Line => {
                // Checked by the match arm
                let kind = self.shape_kind().unwrap_or(ShapeKind::Rectangle);
                (Bindings::builder(kind), None)
            }
            Mode::Pencil => (Bindings::NONE, Some(Brush::pencil(options))),
            Mode::Eraser => (Bindings::NONE, Some(Brush::eraser(options))),
            Mode::Select => (Bindings::selection(), None),
            Mode::None | Mode::Text => (Bindings::NONE, None),
        };
        ModeEntry {
            mode: self,
            bindings,
            brush,
            selection_enabled: select,
            shapes_selectable: select,
            hover_cursor: if select {
                HoverCursor::AllScroll
            } else {
                HoverCursor::Auto
            },
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognised mode name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown mode: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        if wanted.is_empty() {
            return Ok(Mode::None);
        }
        Mode::ALL
            .into_iter()
            .find(|mode| mode.name() == wanted)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

/// What a bound pointer handler does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerHandler {
    /// Press: create the provisional shape at the anchor.
    BeginShape(ShapeKind),
    /// Move: stretch the provisional shape to the pointer.
    ResizeShape(ShapeKind),
    /// Release: let go of the provisional shape.
    EndShape(ShapeKind),
    /// Press: make the shape under the pointer the active object.
    PickObject,
    /// Move: drag the active object.
    DragObject,
    /// Release: stop dragging.
    DropObject,
}

/// The three pointer bindings of the canvas. Each slot holds at most one
/// handler, so rebinding can never stack duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bindings {
    pub press: Option<PointerHandler>,
    pub motion: Option<PointerHandler>,
    pub release: Option<PointerHandler>,
}

impl Bindings {
    /// Nothing bound.
    pub const NONE: Bindings = Bindings {
        press: None,
        motion: None,
        release: None,
    };

    /// Bindings driving a shape builder.
    pub fn builder(kind: ShapeKind) -> Self {
        Self {
            press: Some(PointerHandler::BeginShape(kind)),
            motion: Some(PointerHandler::ResizeShape(kind)),
            release: Some(PointerHandler::EndShape(kind)),
        }
    }

    /// Bindings for picking and dragging objects.
    pub fn selection() -> Self {
        Self {
            press: Some(PointerHandler::PickObject),
            motion: Some(PointerHandler::DragObject),
            release: Some(PointerHandler::DropObject),
        }
    }

    /// Number of occupied slots.
    pub fn bound_count(&self) -> usize {
        [self.press, self.motion, self.release]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.bound_count() == 0
    }
}

/// Everything a mode declares on entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeEntry {
    pub mode: Mode,
    pub bindings: Bindings,
    /// Free-drawing brush; `Some` puts the canvas into free-drawing state.
    pub brush: Option<Brush>,
    pub selection_enabled: bool,
    pub shapes_selectable: bool,
    pub hover_cursor: HoverCursor,
}

/// Result of a call to [`ModeController::activate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The requested mode was already active.
    Unchanged,
    /// A new mode was entered; the caller applies the canvas flags.
    Entered(ModeEntry),
    /// Bindings were revoked and a text object must be inserted. The
    /// controller is back in [`Mode::None`].
    InsertText,
}

/// Owns the pointer bindings and switches modes.
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    bindings: Bindings,
    /// How many times a non-empty binding set has been installed.
    installs: u64,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `mode`, updating `options.mode`.
    ///
    /// Re-activating the current mode is a no-op.
    pub fn activate(&mut self, options: &mut DrawingOptions, mode: Mode) -> Transition {
        if mode != Mode::Text && options.mode == mode {
            return Transition::Unchanged;
        }

        self.revoke();

        if mode == Mode::Text {
            options.mode = Mode::None;
            log::debug!("text insertion, bindings revoked");
            return Transition::InsertText;
        }

        let entry = mode.entry(options);
        self.install(entry.bindings);
        log::debug!("mode {} -> {}", options.mode, mode);
        options.mode = mode;
        Transition::Entered(entry)
    }

    /// Currently bound handlers.
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Number of binding installs so far.
    pub fn installs(&self) -> u64 {
        self.installs
    }

    fn revoke(&mut self) {
        self.bindings = Bindings::NONE;
    }

    fn install(&mut self, bindings: Bindings) {
        debug_assert!(self.bindings.is_empty(), "install without revoke");
        self.bindings = bindings;
        if !bindings.is_empty() {
            self.installs += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_binds_builder() {
        let mut options = DrawingOptions::default();
        let mut controller = ModeController::new();

        let transition = controller.activate(&mut options, Mode::Rectangle);
        assert!(matches!(transition, Transition::Entered(_)));
        assert_eq!(options.mode, Mode::Rectangle);
        assert_eq!(*controller.bindings(), Bindings::builder(ShapeKind::Rectangle));
        assert_eq!(controller.bindings().bound_count(), 3);
    }

    #[test]
    fn test_activate_same_mode_is_noop() {
        let mut options = DrawingOptions::default();
        let mut controller = ModeController::new();

        controller.activate(&mut options, Mode::Line);
        let installs = controller.installs();
        assert_eq!(controller.activate(&mut options, Mode::Line), Transition::Unchanged);
        assert_eq!(controller.installs(), installs);
        assert_eq!(*controller.bindings(), Bindings::builder(ShapeKind::Line));
    }

    #[test]
    fn test_switch_replaces_bindings() {
        let mut options = DrawingOptions::default();
        let mut controller = ModeController::new();

        controller.activate(&mut options, Mode::Ellipse);
        controller.activate(&mut options, Mode::Triangle);
        assert_eq!(*controller.bindings(), Bindings::builder(ShapeKind::Triangle));
        assert_eq!(controller.installs(), 2);
    }

    #[test]
    fn test_free_drawing_modes_install_brush_only() {
        let mut options = DrawingOptions::default();
        options.set_width(9).unwrap();
        let mut controller = ModeController::new();

        match controller.activate(&mut options, Mode::Eraser) {
            Transition::Entered(entry) => {
                assert!(entry.bindings.is_empty());
                let brush = entry.brush.unwrap();
                assert_eq!(brush.kind, BrushKind::Eraser);
                assert_eq!(brush.width, 9);
            }
            other => panic!("unexpected transition {other:?}"),
        }
        assert!(controller.bindings().is_empty());
    }

    #[test]
    fn test_eraser_twice_is_idempotent() {
        let mut options = DrawingOptions::default();
        let mut controller = ModeController::new();

        controller.activate(&mut options, Mode::Eraser);
        let before = *controller.bindings();
        assert_eq!(controller.activate(&mut options, Mode::Eraser), Transition::Unchanged);
        assert_eq!(*controller.bindings(), before);
    }

    #[test]
    fn test_text_is_one_shot() {
        let mut options = DrawingOptions::default();
        let mut controller = ModeController::new();

        controller.activate(&mut options, Mode::Rectangle);
        assert_eq!(controller.activate(&mut options, Mode::Text), Transition::InsertText);
        assert_eq!(options.mode, Mode::None);
        assert!(controller.bindings().is_empty());

        // The previous tool can be picked again afterwards
        assert!(matches!(
            controller.activate(&mut options, Mode::Rectangle),
            Transition::Entered(_)
        ));
    }

    #[test]
    fn test_select_entry_flags() {
        let entry = Mode::Select.entry(&DrawingOptions::default());
        assert!(entry.selection_enabled);
        assert!(entry.shapes_selectable);
        assert_eq!(entry.hover_cursor, HoverCursor::AllScroll);
        assert_eq!(entry.bindings, Bindings::selection());

        for mode in [Mode::Rectangle, Mode::Pencil, Mode::Eraser, Mode::Line] {
            let entry = mode.entry(&DrawingOptions::default());
            assert!(!entry.selection_enabled);
            assert!(!entry.shapes_selectable);
            assert_eq!(entry.hover_cursor, HoverCursor::Auto);
        }
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("rectangle".parse::<Mode>(), Ok(Mode::Rectangle));
        assert_eq!(" ERASER ".parse::<Mode>(), Ok(Mode::Eraser));
        assert_eq!("".parse::<Mode>(), Ok(Mode::None));
        assert!("lasso".parse::<Mode>().is_err());
    }
}
