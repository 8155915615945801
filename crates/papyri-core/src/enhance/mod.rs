//! Enhancement operators and postprocessing
//!
//! Lightness-domain operators take the CIELAB decomposition of a color
//! raster (or the single channel of a grayscale one) and return a new
//! lightness field in 0.0-1.0. The chroma planes are carried through to
//! the rendered output untouched, except by the blue shift.

mod clahe;
mod retinex;


pub use clahe::{adaptive_contrast, clahe};
pub use retinex::{CommandRetinex, Retinex};

use rayon::prelude::*;

use crate::classify::{Classification, GraySource, RasterImage};
use crate::color::{rescale, rgb8_array_to_hsv, LabColorField};
use crate::models::Postprocess;
use crate::segment::BackgroundMask;

/// Euclidean norm of each Lab triple, rescaled to 0.0-1.0.
pub fn vividness(lab: &LabColorField) -> Vec<f32> {
    let norm: Vec<f32> = lab
        .l
        .par_iter()
        .zip(lab.a.par_iter())
        .zip(lab.b.par_iter())
        .map(|((l, a), b)| (l * l + a * a + b * b).sqrt())
        .collect();
    rescale(&norm)
}

/// Lightness / saturation / value blend.
///
/// Pixels whose value sits far from their inverted saturation, and dark
/// pixels, are pushed toward zero.
pub fn lsv(lab: &LabColorField, rgb: &[u8]) -> Vec<f32> {
    let hsv = rgb8_array_to_hsv(rgb);
    let distance: Vec<f32> = hsv.iter().map(|p| (p.v - (1.0 - p.s)).abs()).collect();
    let inverted: Vec<f32> = lab.l.iter().map(|l| 100.0 - l).collect();
    let d = rescale(&distance);
    let l = rescale(&inverted);
    d.iter().zip(&l).map(|(d, l)| 1.0 - (d + l) / 2.0).collect()
}

/// Put the background back.
///
/// Foreground pixels keep the enhanced value; background pixels take the
/// larger of the enhanced and the original value.
pub fn reinsert(enhanced: &[f32], original: &[f32], mask: &BackgroundMask) -> Vec<f32> {
    enhanced
        .iter()
        .zip(original)
        .zip(&mask.background)
        .map(|((&e, &o), &background)| if background { e.max(o) } else { e })
        .collect()
}

/// [`reinsert`] over 8-bit samples, for results produced outside the
/// lightness domain. Each sample of a background pixel is compared on its own.
pub fn reinsert_samples(
    enhanced: &RasterImage,
    original: &RasterImage,
    mask: &BackgroundMask,
) -> RasterImage {
    let channels = enhanced.channels() as usize;
    let data = enhanced
        .data
        .chunks_exact(channels)
        .zip(original.data.chunks_exact(channels))
        .zip(&mask.background)
        .flat_map(|((e, o), &background)| {
            e.iter()
                .zip(o)
                .map(move |(&e, &o)| if background { e.max(o) } else { e })
        })
        .collect();
    RasterImage {
        data,
        ..enhanced.clone()
    }
}

pub fn negative(field: &[f32]) -> Vec<f32> {
    field.iter().map(|v| 1.0 - v).collect()
}

/// Render a lightness-domain result with the requested postprocessing.
///
/// Color results are recomposed with the source chroma planes (negated for
/// the blue shift); grayscale results are quantized directly.
pub fn render(
    field: &[f32],
    post: Postprocess,
    lab: Option<&LabColorField>,
    source: &RasterImage,
) -> RasterImage {
    let lightness = match post {
        Postprocess::Primary => field.to_vec(),
        Postprocess::Negative | Postprocess::Blue => negative(field),
    };

    match lab {
        Some(lab) => {
            let data = if post == Postprocess::Blue {
                let a: Vec<f32> = lab.a.iter().map(|v| -v).collect();
                let b: Vec<f32> = lab.b.iter().map(|v| -v).collect();
                LabColorField::compose_rgb8(&lightness, &a, &b)
            } else {
                LabColorField::compose_rgb8(&lightness, &lab.a, &lab.b)
            };
            RasterImage {
                width: source.width,
                height: source.height,
                data,
                classification: source.classification,
            }
        }
        None => {
            let gray_source = match source.classification {
                Classification::Grayscale(s) => s,
                Classification::Color => GraySource::SingleChannel,
            };
            RasterImage::gray_from_unit(source.width, source.height, &lightness, gray_source)
        }
    }
}
