//! Scene document and runtime canvas state.

use crate::camera::Camera;
use crate::selection::SelectionTheme;
use crate::shapes::{Image, Shape, ShapeId};
use crate::tools::{Brush, ModeEntry};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current scene format version.
pub const SCENE_VERSION: u32 = 1;

fn default_version() -> u32 {
    SCENE_VERSION
}

/// The finalized shapes of a whiteboard plus an optional background image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Background image, drawn under every shape.
    #[serde(default)]
    pub background: Option<Image>,
    /// All shapes in the scene, keyed by ID.
    #[serde(default)]
    pub shapes: HashMap<ShapeId, Shape>,
    /// Z-order of shapes (back to front).
    #[serde(default)]
    pub z_order: Vec<ShapeId>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            version: SCENE_VERSION,
            background: None,
            shapes: HashMap::new(),
            z_order: Vec::new(),
        }
    }

    /// Add a shape on top of the others.
    pub fn add_shape(&mut self, shape: Shape) {
        let id = shape.id();
        if self.shapes.insert(id, shape).is_none() {
            self.z_order.push(id);
        }
    }

    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        self.z_order.retain(|&shape_id| shape_id != id);
        self.shapes.remove(&id)
    }

    /// Remove every shape. The background stays.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.z_order.clear();
    }

    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn get_shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    /// Get shapes in z-order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Find shapes at a point, front to back.
    pub fn shapes_at_point(&self, point: Point, tolerance: f64) -> Vec<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|&id| {
                self.shapes
                    .get(&id)
                    .filter(|s| s.hit_test(point, tolerance))
                    .map(|_| id)
            })
            .collect()
    }

    /// Set the selectable flag of every shape.
    pub fn set_all_selectable(&mut self, selectable: bool) {
        for shape in self.shapes.values_mut() {
            shape.set_selectable(selectable);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Serialize the scene to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a scene from JSON.
    ///
    /// The z-order is repaired: unknown ids are dropped and shapes missing
    /// from it are appended.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut scene: Scene = serde_json::from_str(json)?;
        scene.repair_z_order();
        Ok(scene)
    }

    fn repair_z_order(&mut self) {
        let shapes = &self.shapes;
        let mut seen = std::collections::HashSet::new();
        self.z_order
            .retain(|id| shapes.contains_key(id) && seen.insert(*id));
        let mut missing: Vec<ShapeId> = self
            .shapes
            .keys()
            .filter(|id| !seen.contains(*id))
            .copied()
            .collect();
        missing.sort();
        self.z_order.extend(missing);
    }
}

/// Cursor shown while hovering over a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HoverCursor {
    #[default]
    Move,
    Auto,
    AllScroll,
}

impl HoverCursor {
    /// CSS cursor keyword.
    pub fn css(self) -> &'static str {
        match self {
            HoverCursor::Move => "move",
            HoverCursor::Auto => "auto",
            HoverCursor::AllScroll => "all-scroll",
        }
    }
}

/// Runtime canvas state (not persisted).
#[derive(Debug, Clone)]
pub struct Canvas {
    pub scene: Scene,
    pub camera: Camera,
    /// Drawing surface size in pixels.
    pub width: f64,
    pub height: f64,
    /// Whether objects can be picked at all.
    pub selection_enabled: bool,
    pub hover_cursor: HoverCursor,
    /// Free-drawing brush; `Some` while a pencil or eraser mode is active.
    pub free_drawing: Option<Brush>,
    pub theme: SelectionTheme,
    active: Option<ShapeId>,
    render_requested: bool,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            scene: Scene::new(),
            camera: Camera::new(),
            width,
            height,
            selection_enabled: false,
            hover_cursor: HoverCursor::default(),
            free_drawing: None,
            theme: SelectionTheme::default(),
            active: None,
            render_requested: false,
        }
    }

    pub fn size(&self) -> kurbo::Size {
        kurbo::Size::new(self.width, self.height)
    }

    /// Apply the canvas flags a mode declares on entry. Entering any mode
    /// drops the active selection.
    pub fn apply_entry(&mut self, entry: &ModeEntry) {
        self.free_drawing = entry.brush;
        self.selection_enabled = entry.selection_enabled;
        self.scene.set_all_selectable(entry.shapes_selectable);
        self.hover_cursor = entry.hover_cursor;
        self.active = None;
        self.request_render();
    }

    /// Convert a pointer position to canvas coordinates.
    pub fn screen_to_canvas(&self, point: Point) -> Point {
        self.camera.screen_to_world(point)
    }

    /// Topmost shape under `point` that can be picked.
    pub fn pick(&self, point: Point) -> Option<ShapeId> {
        if !self.selection_enabled {
            return None;
        }
        self.scene
            .shapes_at_point(point, 0.0)
            .into_iter()
            .find(|id| self.scene.get_shape(*id).is_some_and(Shape::selectable))
    }

    pub fn active(&self) -> Option<ShapeId> {
        self.active
    }

    pub fn active_shape(&self) -> Option<&Shape> {
        self.active.and_then(|id| self.scene.get_shape(id))
    }

    pub fn set_active(&mut self, id: Option<ShapeId>) {
        self.active = id;
        self.request_render();
    }

    /// Remove a shape, dropping it from the selection too.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        if self.active == Some(id) {
            self.active = None;
        }
        let removed = self.scene.remove_shape(id);
        if removed.is_some() {
            self.request_render();
        }
        removed
    }

    pub fn request_render(&mut self) {
        self.render_requested = true;
    }

    /// Returns whether a render was requested since the last call.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_requested)
    }
}
