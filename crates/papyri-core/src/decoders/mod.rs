//! Image decoders
//!
//! Reads TIFF, PNG and JPEG files into 8-bit sample grids that keep the
//! source's native channel count, so classification can see alpha and
//! two-channel layouts.


use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::{EnhanceError, Result};

/// Extensions accepted as batch inputs
pub const SUPPORTED_EXTENSIONS: &[&str] = &["tif", "tiff", "png", "jpg", "jpeg"];

/// Decoded image data
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Interleaved 8-bit samples
    pub data: Vec<u8>,

    /// Number of channels as stored in the source (1-4)
    pub channels: u8,
}

impl DecodedImage {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Decode an image from a file path
pub fn decode_image<P: AsRef<Path>>(path: P) -> Result<DecodedImage> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| EnhanceError::UnsupportedFormat("no file extension".to_string()))?;

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(EnhanceError::UnsupportedFormat(extension));
    }

    let image = image::open(path)?;
    let decoded = from_dynamic(image);
    debug!(
        path = %path.display(),
        width = decoded.width,
        height = decoded.height,
        channels = decoded.channels,
        "decoded"
    );
    Ok(decoded)
}

/// Reduce any decoded image to 8-bit samples, preserving its channel layout.
///
/// 16-bit and float sources are scaled down; palette images arrive here
/// already expanded by the codec.
pub fn from_dynamic(image: DynamicImage) -> DecodedImage {
    let width = image.width();
    let height = image.height();
    let channels = image.color().channel_count();

    let data = match channels {
        1 => image.into_luma8().into_raw(),
        2 => image.into_luma_alpha8().into_raw(),
        3 => image.into_rgb8().into_raw(),
        _ => image.into_rgba8().into_raw(),
    };

    DecodedImage {
        width,
        height,
        data,
        channels: channels.min(4),
    }
}
