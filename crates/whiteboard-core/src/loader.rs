//! Bookkeeping for asynchronous image loads.
//!
//! Fetching and decoding happen outside the core (in the browser or through
//! the `image` crate). The core hands out a [`LoadTicket`] when a load is
//! requested and checks it again when the result comes back, so that a
//! stale background or a load finishing after unmount is dropped.

use crate::shapes::{Image, ImageFormat, ShapeId};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Point;
use thiserror::Error;

/// Image loading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Failed to fetch image: {0}")]
    Fetch(String),
    #[error("Malformed data URL")]
    InvalidDataUrl,
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to decode image: {0}")]
    Decode(String),
}

/// Result type for image loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// What happened to a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The image was placed on the canvas.
    Applied(ShapeId),
    /// A newer request or an unmount made this load obsolete.
    Superseded,
}

/// Where a loaded image goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTarget {
    /// Replaces the background, scaled to the canvas height and centered.
    Background,
    /// Added as a regular object at the origin, scaled to the canvas height.
    Upload,
}

/// Handle for one outstanding load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub target: LoadTarget,
    /// URL or data URL of the image.
    pub source: String,
    generation: u64,
    epoch: u64,
}

/// A decoded image ready to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    /// The encoded bytes, kept so the scene can be serialized.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl LoadedImage {
    /// Build an image shape at its natural size.
    pub fn to_shape(&self, position: Point) -> Image {
        Image::new(position, &self.data, self.width, self.height, self.format)
    }
}

/// Generation counters for background loads and the unmount epoch.
#[derive(Debug, Clone, Default)]
pub struct ImageLoader {
    background_generation: u64,
    upload_generation: u64,
    epoch: u64,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load. A background request supersedes every earlier
    /// background request; uploads never supersede each other.
    pub fn request(&mut self, target: LoadTarget, source: impl Into<String>) -> LoadTicket {
        let generation = match target {
            LoadTarget::Background => {
                self.background_generation += 1;
                self.background_generation
            }
            LoadTarget::Upload => {
                self.upload_generation += 1;
                self.upload_generation
            }
        };
        LoadTicket {
            target,
            source: source.into(),
            generation,
            epoch: self.epoch,
        }
    }

    /// Whether a completed load should still be applied.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }
        match ticket.target {
            LoadTarget::Background => ticket.generation == self.background_generation,
            LoadTarget::Upload => true,
        }
    }

    /// Invalidate every outstanding ticket.
    pub fn cancel_all(&mut self) {
        self.epoch += 1;
    }
}

/// Payload of a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Parse a base64 `data:` URL such as `data:image/png;base64,iVBOR...`.
pub fn parse_data_url(url: &str) -> LoadResult<DataUrl> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or(LoadError::InvalidDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(LoadError::InvalidDataUrl)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(LoadError::InvalidDataUrl)?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| LoadError::InvalidDataUrl)?;
    Ok(DataUrl {
        mime_type: mime_type.to_string(),
        bytes,
    })
}

/// Whether `source` is a data URL rather than something to fetch.
pub fn is_data_url(source: &str) -> bool {
    source.trim_start().starts_with("data:")
}
