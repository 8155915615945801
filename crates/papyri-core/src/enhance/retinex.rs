//! Retinex call-out
//!
//! The retinex algorithms are provided by an external program; this module
//! only defines the capability and an adapter that shells out to it.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use image::ImageFormat;
use tracing::debug;

use crate::classify::{Classification, RasterImage};
use crate::error::{EnhanceError, Result};
use crate::models::RetinexDirective;

/// A provider of retinex enhancement.
///
/// Implementations must return an image of the same size and class as the
/// input.
pub trait Retinex {
    fn apply(
        &self,
        image: &RasterImage,
        method: &str,
        directive: RetinexDirective,
    ) -> Result<RasterImage>;
}

/// Runs `<program> <method> <in.png> <out.png> [--negative] [--hue-complement]`.
#[derive(Debug, Clone)]
pub struct CommandRetinex {
    program: PathBuf,
    scratch_dir: PathBuf,
}

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

impl CommandRetinex {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn scratch_paths(&self) -> (PathBuf, PathBuf) {
        let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        let stem = format!("papyri-retinex-{}-{}", std::process::id(), n);
        (
            self.scratch_dir.join(format!("{}-in.png", stem)),
            self.scratch_dir.join(format!("{}-out.png", stem)),
        )
    }

    fn run(
        &self,
        method: &str,
        input: &Path,
        output: &Path,
        directive: RetinexDirective,
    ) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.arg(method).arg(input).arg(output);
        match directive {
            RetinexDirective::None => {}
            RetinexDirective::Negative => {
                command.arg("--negative");
            }
            RetinexDirective::NegativeHueComplement => {
                command.arg("--negative").arg("--hue-complement");
            }
        }
        debug!(?command, "running retinex");

        let failed = |reason: String| EnhanceError::Retinex {
            method: method.to_string(),
            reason,
        };
        let result = command
            .output()
            .map_err(|e| failed(format!("{}: {}", self.program.display(), e)))?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(failed(format!("{} ({})", result.status, stderr.trim())));
        }
        Ok(())
    }
}

impl Retinex for CommandRetinex {
    fn apply(
        &self,
        image: &RasterImage,
        method: &str,
        directive: RetinexDirective,
    ) -> Result<RasterImage> {
        let (input, output) = self.scratch_paths();
        image.to_dynamic()?.save_with_format(&input, ImageFormat::Png)?;

        let result = self
            .run(method, &input, &output, directive)
            .and_then(|_| read_back(&output, image));

        let _ = std::fs::remove_file(&input);
        let _ = std::fs::remove_file(&output);
        result
    }
}

/// Read the program's output in the layout of the image that was sent.
fn read_back(path: &Path, sent: &RasterImage) -> Result<RasterImage> {
    let decoded = image::open(path)?;
    if decoded.width() != sent.width || decoded.height() != sent.height {
        return Err(EnhanceError::InvalidDimensions {
            width: decoded.width(),
            height: decoded.height(),
            channels: sent.channels(),
            len: sent.data.len(),
        });
    }
    let data = match sent.classification {
        Classification::Color => decoded.to_rgb8().into_raw(),
        Classification::Grayscale(_) => decoded.to_luma8().into_raw(),
    };
    Ok(RasterImage {
        width: sent.width,
        height: sent.height,
        data,
        classification: sent.classification,
    })
}
