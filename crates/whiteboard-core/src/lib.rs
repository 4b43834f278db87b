//! Whiteboard Core Library
//!
//! Platform-agnostic state and logic for the whiteboard widget: drawing
//! options, modes, shape builders, the scene and the widget lifecycle.

pub mod camera;
pub mod canvas;
pub mod input;
pub mod loader;
pub mod options;
pub mod pages;
pub mod selection;
pub mod shapes;
pub mod tools;
pub mod whiteboard;

pub use camera::Camera;
pub use canvas::{Canvas, HoverCursor, Scene};
pub use input::{InputState, MouseButton, PointerEvent};
pub use loader::{
    ImageLoader, LoadError, LoadOutcome, LoadResult, LoadTarget, LoadTicket, LoadedImage,
};
pub use options::{DrawingOptions, OptionsError};
pub use pages::{FileReaderInfo, FileReaderUpdate};
pub use selection::{MoveState, SelectionTheme};
pub use tools::{Mode, ModeController, Transition};
pub use whiteboard::{
    EXPORT_FILE_NAME, Whiteboard, WhiteboardConfig, WhiteboardError, WhiteboardEvent,
    WhiteboardResult,
};
