//! The whiteboard widget: one value owning the options, the mode controller,
//! the canvas and the load bookkeeping.

use crate::canvas::{Canvas, Scene};
use crate::input::{InputState, PointerEvent};
use crate::loader::{
    ImageLoader, LoadError, LoadOutcome, LoadResult, LoadTarget, LoadTicket, LoadedImage,
};
use crate::options::{DrawingOptions, OptionsError, parse_width};
use crate::pages::{FileReaderInfo, FileReaderUpdate};
use crate::selection::{MoveState, SelectionTheme};
use crate::shapes::{SerializableColor, Shape, ShapeId, ShapeTrait, Text};
use crate::tools::{
    Bindings, BrushStroke, Mode, ModeController, PointerHandler, ShapeBuilder, Transition,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name used when the canvas is saved as an image.
pub const EXPORT_FILE_NAME: &str = "image.png";

/// Where text objects are inserted.
pub const TEXT_ORIGIN: Point = Point::new(100.0, 100.0);

/// Content of a freshly inserted text object.
pub const TEXT_PLACEHOLDER: &str = "text";

/// Whiteboard errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WhiteboardError {
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("No text object with id {0}")]
    NoSuchText(ShapeId),
    #[error("Text object {0} is not editable")]
    NotEditable(ShapeId),
}

impl From<serde_json::Error> for WhiteboardError {
    fn from(err: serde_json::Error) -> Self {
        WhiteboardError::Serialization(err.to_string())
    }
}

/// Result type for whiteboard operations.
pub type WhiteboardResult<T> = Result<T, WhiteboardError>;

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

/// Widget configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhiteboardConfig {
    /// Drawing surface width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Drawing surface height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub theme: SelectionTheme,
    /// Options a fresh widget starts with.
    #[serde(default)]
    pub options: DrawingOptions,
}

impl Default for WhiteboardConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            theme: SelectionTheme::default(),
            options: DrawingOptions::default(),
        }
    }
}

/// Notifications for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum WhiteboardEvent {
    /// Fired while mounted after every pointer release, clear and text edit.
    SceneChanged { json: String },
}

/// A whiteboard widget instance.
#[derive(Debug)]
pub struct Whiteboard {
    config: WhiteboardConfig,
    options: DrawingOptions,
    controller: ModeController,
    canvas: Canvas,
    builder: ShapeBuilder,
    stroke: Option<BrushStroke>,
    moving: Option<MoveState>,
    input: InputState,
    loader: ImageLoader,
    pages: FileReaderInfo,
    mounted: bool,
    events: Vec<WhiteboardEvent>,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new(WhiteboardConfig::default())
    }
}

impl Whiteboard {
    /// Create the widget and its drawing surface.
    pub fn new(config: WhiteboardConfig) -> Self {
        let mut canvas = Canvas::new(config.width as f64, config.height as f64);
        canvas.theme = config.theme.clone();
        let mut options = config.options.clone();
        // Modes are entered through `activate` only
        options.mode = Mode::None;
        Self {
            config,
            options,
            controller: ModeController::new(),
            canvas,
            builder: ShapeBuilder::new(),
            stroke: None,
            moving: None,
            input: InputState::new(),
            loader: ImageLoader::new(),
            pages: FileReaderInfo::default(),
            mounted: false,
            events: Vec::new(),
        }
    }

    /// Attach change notifications and restore a previously saved scene.
    pub fn mount(&mut self, saved_scene: Option<&str>) -> WhiteboardResult<()> {
        self.mounted = true;
        if let Some(json) = saved_scene {
            self.load_json(json)?;
        }
        self.canvas.request_render();
        log::info!(
            "whiteboard mounted ({}x{}, {} shapes)",
            self.config.width,
            self.config.height,
            self.canvas.scene.len()
        );
        Ok(())
    }

    /// Detach notifications and drop every in-flight load and gesture.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.loader.cancel_all();
        self.builder.cancel();
        self.stroke = None;
        self.moving = None;
        self.events.clear();
        log::info!("whiteboard unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Switch the drawing mode.
    pub fn activate(&mut self, mode: Mode) -> Transition {
        let transition = self.controller.activate(&mut self.options, mode);
        match &transition {
            Transition::Unchanged => {}
            Transition::Entered(entry) => {
                self.abort_gesture();
                self.canvas.apply_entry(entry);
            }
            Transition::InsertText => {
                self.abort_gesture();
                self.canvas.apply_entry(&Mode::None.entry(&self.options));
                self.insert_text();
            }
        }
        transition
    }

    fn abort_gesture(&mut self) {
        self.builder.cancel();
        self.stroke = None;
        self.moving = None;
    }

    fn insert_text(&mut self) -> ShapeId {
        let text =
            Text::new(TEXT_ORIGIN, TEXT_PLACEHOLDER.to_string()).with_color(self.options.color);
        let id = text.id();
        self.canvas.scene.add_shape(Shape::Text(text));
        self.canvas.request_render();
        id
    }

    /// Set the stroke color from a hex string (`#rrggbb` or `rrggbb`).
    pub fn set_color(&mut self, input: &str) -> WhiteboardResult<()> {
        self.options.set_color(input).inspect_err(|err| log::warn!("{err}"))?;
        if let Some(brush) = self.canvas.free_drawing.as_mut() {
            brush.color = self.options.color;
        }
        Ok(())
    }

    /// Set the stroke width.
    pub fn set_width(&mut self, width: u32) -> WhiteboardResult<()> {
        self.options.set_width(width).inspect_err(|err| log::warn!("{err}"))?;
        if let Some(brush) = self.canvas.free_drawing.as_mut() {
            brush.width = self.options.brush_width();
        }
        Ok(())
    }

    /// Set the stroke width from a text input.
    pub fn set_width_input(&mut self, input: &str) -> WhiteboardResult<()> {
        let width = parse_width(input).inspect_err(|err| log::warn!("{err}"))?;
        self.set_width(width)
    }

    pub fn set_fill(&mut self, fill: bool) {
        self.options.fill = fill;
    }

    /// Route a pointer event in screen coordinates.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        if !self.input.handle(&event) {
            return;
        }
        match event {
            PointerEvent::Down { position, .. } => self.pointer_down(position),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position, .. } => self.pointer_up(position),
        }
    }

    /// Primary button pressed at `screen`.
    pub fn pointer_down(&mut self, screen: Point) {
        let point = self.canvas.screen_to_canvas(screen);

        if self.options.mode == Mode::Eraser {
            self.erase_at(point);
        }

        if let Some(brush) = self.canvas.free_drawing {
            self.stroke = Some(brush.begin(point));
            self.canvas.request_render();
            return;
        }

        match self.controller.bindings().press {
            Some(PointerHandler::BeginShape(kind)) => {
                let shape = self.builder.press(kind, point, &self.options);
                self.canvas.scene.add_shape(shape);
                self.canvas.request_render();
            }
            Some(PointerHandler::PickObject) => {
                let picked = self.canvas.pick(point);
                self.canvas.set_active(picked);
                self.moving = picked
                    .and_then(|id| self.canvas.scene.get_shape(id))
                    .map(|shape| MoveState::new(shape.clone(), point));
            }
            _ => {}
        }
    }

    /// Pointer moved to `screen`.
    pub fn pointer_move(&mut self, screen: Point) {
        let point = self.canvas.screen_to_canvas(screen);

        if let Some(stroke) = self.stroke.as_mut() {
            stroke.extend(point);
            self.canvas.request_render();
            return;
        }

        match self.controller.bindings().motion {
            Some(PointerHandler::ResizeShape(_)) => {
                let Some(id) = self.builder.provisional() else {
                    return;
                };
                let resized = self
                    .canvas
                    .scene
                    .get_shape_mut(id)
                    .is_some_and(|shape| self.builder.drag(point, shape));
                if resized {
                    self.canvas.request_render();
                }
            }
            Some(PointerHandler::DragObject) => {
                let Some(state) = self.moving.as_mut() else {
                    return;
                };
                state.current_point = point;
                let moved = state.moved_shape();
                match self.canvas.scene.get_shape_mut(moved.id()) {
                    Some(slot) => {
                        *slot = moved;
                        self.canvas.request_render();
                    }
                    None => self.moving = None,
                }
            }
            _ => {}
        }
    }

    /// Primary button released at `screen`.
    pub fn pointer_up(&mut self, screen: Point) {
        let point = self.canvas.screen_to_canvas(screen);

        if let Some(mut stroke) = self.stroke.take() {
            stroke.extend(point);
            if let Some(freehand) = stroke.finish() {
                self.canvas.scene.add_shape(Shape::Freehand(freehand));
            }
            self.canvas.request_render();
        } else {
            match self.controller.bindings().release {
                Some(PointerHandler::EndShape(_)) => {
                    self.builder.release();
                }
                Some(PointerHandler::DropObject) => {
                    self.moving = None;
                }
                _ => {}
            }
        }

        self.notify_scene_changed();
    }

    /// Remove the topmost shape under `point`. Eraser strokes are not
    /// objects a user can see, so they are skipped.
    fn erase_at(&mut self, point: Point) -> Option<Shape> {
        let target = self
            .canvas
            .scene
            .shapes_at_point(point, 0.0)
            .into_iter()
            .find(|id| {
                !matches!(
                    self.canvas.scene.get_shape(*id),
                    Some(Shape::Freehand(stroke)) if stroke.erasing
                )
            })?;
        let removed = self.canvas.remove_shape(target)?;
        log::debug!("eraser removed {} {target}", removed.kind_name());
        Some(removed)
    }

    /// Remove every object. The background stays.
    pub fn clear(&mut self) {
        self.canvas.scene.clear();
        self.canvas.set_active(None);
        self.moving = None;
        self.notify_scene_changed();
    }

    /// Replace the content of a text object.
    pub fn set_text(&mut self, id: ShapeId, content: impl Into<String>) -> WhiteboardResult<()> {
        let Some(Shape::Text(text)) = self.canvas.scene.get_shape_mut(id) else {
            return Err(WhiteboardError::NoSuchText(id));
        };
        if !text.editable {
            return Err(WhiteboardError::NotEditable(id));
        }
        text.set_content(content.into());
        self.canvas.request_render();
        self.notify_scene_changed();
        Ok(())
    }

    /// Serialize the scene.
    pub fn to_json(&self) -> WhiteboardResult<String> {
        Ok(self.canvas.scene.to_json()?)
    }

    /// Replace the scene with a serialized one.
    pub fn load_json(&mut self, json: &str) -> WhiteboardResult<()> {
        let scene = Scene::from_json(json).inspect_err(|err| log::warn!("Invalid scene: {err}"))?;
        self.abort_gesture();
        self.canvas.scene = scene;
        self.canvas.set_active(None);
        Ok(())
    }

    /// Merge an update from the page provider. Returns a ticket when the
    /// current page changed and a new background has to be fetched.
    pub fn update_file_reader_info(&mut self, update: FileReaderUpdate) -> Option<LoadTicket> {
        if !self.pages.merge(update) || !self.pages.has_page() {
            return None;
        }
        log::debug!("page {} selected", self.pages.current_page_number);
        Some(self.loader.request(LoadTarget::Background, self.pages.current_page.clone()))
    }

    /// Start loading a user-selected image (URL or data URL).
    pub fn request_image_upload(&mut self, source: impl Into<String>) -> LoadTicket {
        self.loader.request(LoadTarget::Upload, source)
    }

    /// Invalidate every outstanding load ticket.
    pub fn cancel_pending_loads(&mut self) {
        self.loader.cancel_all();
    }

    /// Apply the result of a load started with a ticket.
    ///
    /// Stale tickets yield [`LoadOutcome::Superseded`] whatever the result;
    /// a failed load leaves the scene untouched and is returned as an error.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        result: LoadResult<LoadedImage>,
    ) -> WhiteboardResult<LoadOutcome> {
        if !self.loader.is_current(ticket) {
            log::debug!("dropping superseded load of {}", ticket.source);
            return Ok(LoadOutcome::Superseded);
        }
        let loaded =
            result.inspect_err(|err| log::warn!("Loading {} failed: {err}", ticket.source))?;

        let height = self.canvas.height;
        let image = loaded.to_shape(Point::ZERO).scale_to_height(height);
        let id = image.id();
        match ticket.target {
            LoadTarget::Background => {
                let center = Point::new(self.canvas.width / 2.0, height / 2.0);
                self.canvas.scene.background = Some(image.centered_on(center));
            }
            LoadTarget::Upload => {
                self.canvas.scene.add_shape(Shape::Image(image));
            }
        }
        self.canvas.request_render();
        Ok(LoadOutcome::Applied(id))
    }

    fn notify_scene_changed(&mut self) {
        if !self.mounted {
            return;
        }
        match self.canvas.scene.to_json() {
            Ok(json) => self.events.push(WhiteboardEvent::SceneChanged { json }),
            Err(err) => log::warn!("Failed to serialize scene: {err}"),
        }
    }

    /// Take the pending notifications.
    pub fn drain_events(&mut self) -> Vec<WhiteboardEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &WhiteboardConfig {
        &self.config
    }

    pub fn options(&self) -> &DrawingOptions {
        &self.options
    }

    pub fn mode(&self) -> Mode {
        self.options.mode
    }

    pub fn color(&self) -> SerializableColor {
        self.options.color
    }

    pub fn bindings(&self) -> &Bindings {
        self.controller.bindings()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn scene(&self) -> &Scene {
        &self.canvas.scene
    }

    pub fn pages(&self) -> &FileReaderInfo {
        &self.pages
    }

    /// Id of the shape being built, if a gesture is in progress.
    pub fn provisional(&self) -> Option<ShapeId> {
        self.builder.provisional()
    }

    /// Free-drawing stroke in progress, for live display.
    pub fn stroke_preview(&self) -> Option<Shape> {
        self.stroke
            .as_ref()
            .map(|stroke| Shape::Freehand(stroke.preview()))
    }

    /// Returns whether a render was requested since the last call.
    pub fn take_render_request(&mut self) -> bool {
        self.canvas.take_render_request()
    }
}
