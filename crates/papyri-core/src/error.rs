//! Error and warning types for the enhancement pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the enhancement pipeline.
#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported channel count: {0}")]
    UnsupportedChannels(u8),

    #[error("Sample buffer of {len} bytes does not match {width}x{height}x{channels}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        channels: u8,
        len: usize,
    },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Color profile error: {0}")]
    Profile(String),

    #[error("Retinex {method} failed: {reason}")]
    Retinex { method: String, reason: String },

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EnhanceError>;

/// Non-fatal conditions collected during a batch.
///
/// These are returned to the caller alongside the outputs; none of them stop
/// the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Gamut expansion could not be set up and is skipped for the whole run.
    GamutExpansionDisabled { reason: String },

    /// A grayscale image was processed with color-only operators selected.
    GrayscaleUnsupported { path: PathBuf, methods: Vec<String> },

    /// One retinex variant could not be produced and was skipped.
    RetinexFailed { label: String, reason: String },

    /// A configuration value was out of range and has been adjusted.
    ConfigAdjusted(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::GamutExpansionDisabled { reason } => {
                write!(f, "gamut expansion disabled for this run: {}", reason)
            }
            Warning::GrayscaleUnsupported { path, methods } => write!(
                f,
                "{} is grayscale; {} only support color images, select Adapthisteq or Retinex instead",
                path.display(),
                methods.join(", ")
            ),
            Warning::RetinexFailed { label, reason } => {
                write!(f, "{} skipped: {}", label, reason)
            }
            Warning::ConfigAdjusted(message) => write!(f, "{}", message),
        }
    }
}
