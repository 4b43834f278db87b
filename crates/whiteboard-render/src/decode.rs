//! Decoding image sources into [`LoadedImage`]s.

use std::path::Path;
use whiteboard_core::loader::{LoadError, LoadResult, LoadedImage, is_data_url, parse_data_url};
use whiteboard_core::shapes::ImageFormat;

/// Decode encoded image bytes, keeping them for serialization.
pub fn decode_image(bytes: &[u8]) -> LoadResult<LoadedImage> {
    let format = ImageFormat::from_magic_bytes(bytes).ok_or_else(|| {
        let head: Vec<String> = bytes.iter().take(4).map(|b| format!("{b:02x}")).collect();
        LoadError::UnsupportedFormat(format!("unrecognized header {}", head.join(" ")))
    })?;
    let decoded =
        image::load_from_memory(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;
    log::debug!(
        "Decoded {:?} image {}x{}",
        format,
        decoded.width(),
        decoded.height()
    );
    Ok(LoadedImage {
        data: bytes.to_vec(),
        width: decoded.width(),
        height: decoded.height(),
        format,
    })
}

/// Decode the payload of a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> LoadResult<LoadedImage> {
    let data_url = parse_data_url(url)?;
    if ImageFormat::from_mime_type(&data_url.mime_type).is_none()
        && ImageFormat::from_magic_bytes(&data_url.bytes).is_none()
    {
        return Err(LoadError::UnsupportedFormat(data_url.mime_type));
    }
    decode_image(&data_url.bytes)
}

/// Load an image from a data URL or a local file path. Paths with an
/// extension must name a supported format; others are sniffed.
pub fn load_image_source(source: &str) -> LoadResult<LoadedImage> {
    if is_data_url(source) {
        return decode_data_url(source);
    }
    let path = Path::new(source);
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        if ImageFormat::from_extension(ext).is_none() {
            return Err(LoadError::UnsupportedFormat(ext.to_string()));
        }
    }
    let bytes = std::fs::read(path)
        .map_err(|e| LoadError::Fetch(format!("{}: {e}", path.display())))?;
    decode_image(&bytes)
}
