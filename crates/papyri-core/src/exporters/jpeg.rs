//! JPEG writer and external ICC embedding

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::process::Command;

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use tracing::debug;

use crate::classify::{Classification, RasterImage};
use crate::error::Result;

/// Write `image` as a baseline JPEG. Quality is clamped to 1-100.
pub fn export_jpeg(image: &RasterImage, path: &Path, quality: i32) -> Result<()> {
    let file = File::create(path)?;
    let quality = quality.clamp(1, 100) as u8;
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
    let color_type = match image.classification {
        Classification::Color => ExtendedColorType::Rgb8,
        Classification::Grayscale(_) => ExtendedColorType::L8,
    };
    encoder.encode(&image.data, image.width, image.height, color_type)?;
    Ok(())
}

/// Embed `profile` into the JPEG at `path` with exiftool.
///
/// Returns a status message instead of failing; a missing exiftool or a
/// rejected profile never loses the written image.
pub fn embed_icc_with_exiftool(exiftool: &Path, profile: &Path, path: &Path) -> Option<String> {
    let result = Command::new(exiftool)
        .arg(format!("-icc_profile<={}", profile.display()))
        .arg("-overwrite_original")
        .arg(path)
        .output();

    match result {
        Ok(output) if output.status.success() => {
            debug!(path = %path.display(), "embedded ICC profile");
            None
        }
        Ok(output) => Some(format!(
            "{}: ICC profile not embedded ({}): {}",
            path.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )),
        Err(e) => Some(format!(
            "{}: ICC profile not embedded, could not run {}: {}",
            path.display(),
            exiftool.display(),
            e
        )),
    }
}
