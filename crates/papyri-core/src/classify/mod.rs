//! Grayscale / color classification of decoded rasters

#[cfg(test)]
mod tests;

use image::{DynamicImage, GrayImage, RgbImage};

use crate::decoders::DecodedImage;
use crate::error::{EnhanceError, Result};
use crate::models::ImageClass;

/// Where a grayscale raster came from. Only output naming depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraySource {
    /// Single-channel source file
    SingleChannel,

    /// Three pixel-identical channels collapsed to one
    CollapsedChannels,

    /// Red channel kept on request
    RedChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Color,
    Grayscale(GraySource),
}

impl Classification {
    pub fn class(&self) -> ImageClass {
        match self {
            Self::Color => ImageClass::Color,
            Self::Grayscale(_) => ImageClass::Grayscale,
        }
    }

    pub fn is_grayscale(&self) -> bool {
        matches!(self, Self::Grayscale(_))
    }

    pub fn is_red_channel(&self) -> bool {
        matches!(self, Self::Grayscale(GraySource::RedChannel))
    }
}

/// A classified 8-bit raster with one (grayscale) or three (color) channels.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub classification: Classification,
}

impl RasterImage {
    pub fn channels(&self) -> u8 {
        match self.classification {
            Classification::Color => 3,
            Classification::Grayscale(_) => 1,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn class(&self) -> ImageClass {
        self.classification.class()
    }

    /// Build a single-channel raster from samples already in 0.0-1.0.
    pub fn gray_from_unit(width: u32, height: u32, values: &[f32], source: GraySource) -> Self {
        Self {
            width,
            height,
            data: values.iter().map(|&v| unit_to_u8(v)).collect(),
            classification: Classification::Grayscale(source),
        }
    }

    /// Wrap the samples in an `image` buffer for encoding.
    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        let invalid = || EnhanceError::InvalidDimensions {
            width: self.width,
            height: self.height,
            channels: self.channels(),
            len: self.data.len(),
        };
        let image = match self.classification {
            Classification::Color => DynamicImage::ImageRgb8(
                RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(invalid)?,
            ),
            Classification::Grayscale(_) => DynamicImage::ImageLuma8(
                GrayImage::from_raw(self.width, self.height, self.data.clone())
                    .ok_or_else(invalid)?,
            ),
        };
        Ok(image)
    }

    /// Single-channel samples scaled to 0.0-1.0.
    pub fn gray_unit(&self) -> Vec<f32> {
        self.data.iter().map(|&v| v as f32 / 255.0).collect()
    }
}

#[inline]
pub(crate) fn unit_to_u8(v: f32) -> u8 {
    if v.is_finite() {
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        0
    }
}

/// Classify a decoded image.
///
/// - more than three channels: the extra (alpha) channels are dropped
/// - one channel: grayscale
/// - two channels: a zero third channel is added and the image is color
/// - three identical channels: collapsed to one, grayscale
/// - otherwise color
///
/// With `red_only`, color images keep only their first channel.
pub fn classify(decoded: DecodedImage, red_only: bool) -> Result<RasterImage> {
    let DecodedImage {
        width,
        height,
        data,
        channels,
    } = decoded;

    if channels == 0 {
        return Err(EnhanceError::UnsupportedChannels(channels));
    }
    let pixels = width as usize * height as usize;
    if data.len() != pixels * channels as usize {
        return Err(EnhanceError::InvalidDimensions {
            width,
            height,
            channels,
            len: data.len(),
        });
    }

    let (data, classification) = match channels {
        1 => (data, Classification::Grayscale(GraySource::SingleChannel)),
        2 => {
            let mut rgb = Vec::with_capacity(pixels * 3);
            for px in data.chunks_exact(2) {
                rgb.extend_from_slice(&[px[0], px[1], 0]);
            }
            (rgb, Classification::Color)
        }
        n => {
            let rgb = if n == 3 {
                data
            } else {
                let stride = n as usize;
                data.chunks_exact(stride)
                    .flat_map(|px| [px[0], px[1], px[2]])
                    .collect()
            };
            if channels_identical(&rgb) {
                (
                    take_channel(&rgb, 0),
                    Classification::Grayscale(GraySource::CollapsedChannels),
                )
            } else {
                (rgb, Classification::Color)
            }
        }
    };

    if red_only && classification == Classification::Color {
        return Ok(RasterImage {
            width,
            height,
            data: take_channel(&data, 0),
            classification: Classification::Grayscale(GraySource::RedChannel),
        });
    }

    Ok(RasterImage {
        width,
        height,
        data,
        classification,
    })
}

fn channels_identical(rgb: &[u8]) -> bool {
    rgb.chunks_exact(3).all(|px| px[0] == px[1] && px[1] == px[2])
}

fn take_channel(rgb: &[u8], channel: usize) -> Vec<u8> {
    rgb.chunks_exact(3).map(|px| px[channel]).collect()
}
