//! Image sinks and output naming
//!
//! Variants are written as 8-bit TIFF and/or JPEG. RGB TIFF files carry the
//! sRGB profile in their ICCProfile tag; RGB JPEG files get it from exiftool.
//! Grayscale outputs are written without a profile. Profile embedding
//! problems are reported as status messages, never as errors.

mod jpeg;
mod tiff8;

#[cfg(test)]
mod tests;

pub use self::jpeg::{embed_icc_with_exiftool, export_jpeg};
pub use self::tiff8::{export_tiff8, TAG_ICC_PROFILE};

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::classify::RasterImage;
use crate::color::srgb_icc_bytes;
use crate::error::Result;
use crate::models::{Background, OutputFormat};

/// Method label used for the persisted background mask.
pub const MASK_LABEL: &str = "mask";

/// Where produced variants go.
pub trait ImageSink {
    /// Write `image` under `base` (a path without extension).
    ///
    /// Returns non-fatal profile embedding status messages.
    fn write(&mut self, image: &RasterImage, base: &Path) -> Result<Vec<String>>;
}

/// Writes each variant in every configured format.
#[derive(Debug)]
pub struct FileSink {
    formats: Vec<OutputFormat>,
    jpeg_quality: i32,
    icc_profile: Option<Vec<u8>>,
    exiftool: PathBuf,
    /// Profile file handed to exiftool, written on first use and removed
    /// when the sink is dropped
    icc_file: Option<NamedTempFile>,
}

impl FileSink {
    pub fn new(formats: Vec<OutputFormat>, jpeg_quality: i32) -> Self {
        let icc_profile = match srgb_icc_bytes() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(error = %e, "no sRGB profile to embed");
                None
            }
        };
        Self {
            formats,
            jpeg_quality: jpeg_quality.clamp(0, 100),
            icc_profile,
            exiftool: PathBuf::from("exiftool"),
            icc_file: None,
        }
    }

    pub fn with_exiftool(mut self, program: impl Into<PathBuf>) -> Self {
        self.exiftool = program.into();
        self
    }

    pub fn without_icc(mut self) -> Self {
        self.icc_profile = None;
        self
    }

    fn icc_file(&mut self) -> std::result::Result<PathBuf, String> {
        if let Some(file) = &self.icc_file {
            if file.path().is_file() {
                return Ok(file.path().to_path_buf());
            }
        }
        let bytes = self
            .icc_profile
            .as_deref()
            .ok_or_else(|| "no sRGB profile available".to_string())?;
        let mut file = tempfile::Builder::new()
            .prefix("papyri-sRGB-")
            .suffix(".icc")
            .tempfile()
            .map_err(|e| format!("profile temp file: {}", e))?;
        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| format!("{}: {}", file.path().display(), e))?;
        let path = file.path().to_path_buf();
        self.icc_file = Some(file);
        Ok(path)
    }
}

impl ImageSink for FileSink {
    fn write(&mut self, image: &RasterImage, base: &Path) -> Result<Vec<String>> {
        if let Some(dir) = base.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut statuses = Vec::new();
        let color = !image.classification.is_grayscale();

        for format in self.formats.clone() {
            let path = with_extension(base, format.extension());
            match format {
                OutputFormat::Tiff => {
                    export_tiff8(image, &path, self.icc_profile.as_deref())?;
                    if color && self.icc_profile.is_none() {
                        statuses.push(format!("{}: written without ICC profile", path.display()));
                    }
                }
                OutputFormat::Jpeg => {
                    export_jpeg(image, &path, self.jpeg_quality)?;
                    if color && self.icc_profile.is_some() {
                        match self.icc_file() {
                            Ok(profile) => statuses.extend(embed_icc_with_exiftool(
                                &self.exiftool,
                                &profile,
                                &path,
                            )),
                            Err(e) => statuses.push(format!(
                                "{}: ICC profile not embedded: {}",
                                path.display(),
                                e
                            )),
                        }
                    }
                }
            }
            debug!(path = %path.display(), "wrote variant");
        }
        Ok(statuses)
    }
}

fn with_extension(base: &Path, extension: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Builds output base names for one input file.
///
/// `<stem>_<ext>[_red]-<Method_Label>[-masked-<light|dark>bg][-deshadow]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName {
    prefix: String,
}

impl OutputName {
    pub fn new(input: &Path, red_channel: bool) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let ext = input
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let mut prefix = if ext.is_empty() {
            stem
        } else {
            format!("{}_{}", stem, ext)
        };
        if red_channel {
            prefix.push_str("_red");
        }
        Self { prefix }
    }

    /// Base name for a method label; `masked` carries the background
    /// polarity and whether shadow removal was used.
    pub fn variant(&self, method_label: &str, masked: Option<(Background, bool)>) -> String {
        let mut name = format!("{}-{}", self.prefix, method_label.replace(' ', "_"));
        if let Some((background, deshadow)) = masked {
            name.push_str("-masked-");
            name.push_str(background.tag());
            if deshadow {
                name.push_str("-deshadow");
            }
        }
        name
    }
}
