//! Current drawing options shared by every mode handler of one widget.

use crate::shapes::{SerializableColor, ShapeStyle};
use crate::tools::Mode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest accepted stroke width.
pub const MIN_WIDTH: u32 = 1;
/// Largest accepted stroke width (the width slider's upper bound).
pub const MAX_WIDTH: u32 = 20;
/// Stroke width a fresh widget starts with.
pub const DEFAULT_WIDTH: u32 = 5;

/// Rejected option inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),
    #[error("Invalid stroke width: {0:?} (expected 1..=20)")]
    InvalidWidth(String),
}

/// Mode, stroke color, stroke width and fill toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingOptions {
    /// Active drawing mode.
    #[serde(default)]
    pub mode: Mode,
    /// Stroke (and fill, when enabled) color.
    pub color: SerializableColor,
    /// Stroke / brush width in pixels.
    pub width: u32,
    /// Whether closed shapes are filled with the current color.
    pub fill: bool,
}

impl Default for DrawingOptions {
    fn default() -> Self {
        Self {
            mode: Mode::None,
            color: SerializableColor::black(),
            width: DEFAULT_WIDTH,
            fill: false,
        }
    }
}

impl DrawingOptions {
    /// Parse and apply a hex color.
    pub fn set_color(&mut self, input: &str) -> Result<(), OptionsError> {
        self.color = parse_color(input)?;
        Ok(())
    }

    /// Apply a stroke width.
    pub fn set_width(&mut self, width: u32) -> Result<(), OptionsError> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
            return Err(OptionsError::InvalidWidth(width.to_string()));
        }
        self.width = width;
        Ok(())
    }

    /// Current color as `#rrggbb`.
    pub fn color_hex(&self) -> String {
        self.color.to_hex()
    }

    /// Width handed to free-drawing brushes; never below one pixel.
    pub fn brush_width(&self) -> u32 {
        self.width.max(MIN_WIDTH)
    }

    /// Fill color for new closed shapes: the current color, or none
    /// (transparent) when fill is off.
    pub fn fill_color(&self) -> Option<SerializableColor> {
        self.fill.then_some(self.color)
    }

    /// Snapshot of the style new closed shapes get.
    pub fn shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke_color: self.color,
            stroke_width: self.width as f64,
            fill_color: self.fill_color(),
        }
    }

    /// Snapshot of the style new lines get (lines are never filled).
    pub fn line_style(&self) -> ShapeStyle {
        ShapeStyle {
            fill_color: None,
            ..self.shape_style()
        }
    }
}

/// Parse a hex color typed or picked by the user.
pub fn parse_color(input: &str) -> Result<SerializableColor, OptionsError> {
    SerializableColor::from_hex(input).ok_or_else(|| OptionsError::InvalidColor(input.to_string()))
}

/// Parse a width coming from a text or range input.
pub fn parse_width(input: &str) -> Result<u32, OptionsError> {
    let width: u32 = input
        .trim()
        .parse()
        .map_err(|_| OptionsError::InvalidWidth(input.to_string()))?;
    if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
        return Err(OptionsError::InvalidWidth(input.to_string()));
    }
    Ok(width)
}
