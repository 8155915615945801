//! Background segmentation
//!
//! Texture energy from an even-symmetric Gabor bank is thresholded with
//! Otsu's method to separate ink from the papyrus background.

mod gabor;
mod otsu;

#[cfg(test)]
mod tests;

pub use gabor::{build_bank, envelope_sigmas, filter, magnitude, GaborKernel};
pub use otsu::{otsu_threshold, OtsuResult};

use tracing::debug;

use crate::classify::{Classification, GraySource, RasterImage};
use crate::color::{rescale, LabColorField};
use crate::models::{Background, GaborParams, MaskSettings};

const CHROMATICITY_EPSILON: f32 = 1e-6;

/// Binary background field; `true` marks background.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundMask {
    pub width: u32,
    pub height: u32,
    pub background: Vec<bool>,
}

impl BackgroundMask {
    #[inline]
    pub fn is_background(&self, index: usize) -> bool {
        self.background[index]
    }

    pub fn background_ratio(&self) -> f32 {
        if self.background.is_empty() {
            return 0.0;
        }
        self.background.iter().filter(|&&b| b).count() as f32 / self.background.len() as f32
    }

    /// The mask as a grayscale image, background white.
    pub fn to_raster(&self) -> RasterImage {
        RasterImage {
            width: self.width,
            height: self.height,
            data: self
                .background
                .iter()
                .map(|&b| if b { 255 } else { 0 })
                .collect(),
            classification: Classification::Grayscale(GraySource::SingleChannel),
        }
    }
}

/// Shadow-free lightness: each channel divided by the channel sum, then
/// the CIELAB lightness of that chromaticity image rescaled to 0.0-1.0.
pub fn deshadow_lightness(raster: &RasterImage) -> Vec<f32> {
    let chromaticity: Vec<f32> = raster
        .data
        .chunks_exact(3)
        .flat_map(|px| {
            let r = px[0] as f32 / 255.0;
            let g = px[1] as f32 / 255.0;
            let b = px[2] as f32 / 255.0;
            let sum = r + g + b + CHROMATICITY_EPSILON;
            [r / sum, g / sum, b / sum]
        })
        .collect();
    let field = LabColorField::from_rgb_f32(raster.width, raster.height, &chromaticity);
    field.normalized_lightness()
}

/// Compute the background mask of `raster`.
///
/// `field` is the normalized lightness (color) or channel (grayscale) of the
/// raster. Shadow removal only applies to color rasters; grayscale rasters
/// get the same mask with or without it.
pub fn segment(
    raster: &RasterImage,
    field: &[f32],
    settings: &MaskSettings,
    params: &GaborParams,
) -> BackgroundMask {
    let width = raster.width as usize;
    let height = raster.height as usize;
    let deshadow = settings.deshadow && !raster.classification.is_grayscale();

    let mut input = if deshadow {
        deshadow_lightness(raster)
    } else {
        field.to_vec()
    };
    if settings.background == Background::Dark {
        input.iter_mut().for_each(|v| *v = 1.0 - *v);
    }

    let bank = build_bank(params);
    let energy = rescale(&magnitude(&input, width, height, &bank));
    let otsu = otsu_threshold(&energy);

    let background: Vec<bool> = energy
        .iter()
        .map(|&e| {
            let above = otsu.is_above(e);
            if deshadow {
                above
            } else {
                !above
            }
        })
        .collect();

    let mask = BackgroundMask {
        width: raster.width,
        height: raster.height,
        background,
    };
    debug!(
        threshold = otsu.threshold,
        deshadow,
        background_ratio = mask.background_ratio(),
        "segmented background"
    );
    mask
}
