//! Color management and transformations
//!
//! Provides sRGB <-> CIELAB (D65) conversion for 8-bit rasters, RGB -> HSV,
//! and ICC-based gamut expansion.

mod gamut;
mod hsv;
mod lab;


pub use gamut::{srgb_icc_bytes, GamutExpander, ADOBE_RGB_PROFILE_FILE, SRGB_PROFILE_FILE};
pub use hsv::{rgb8_array_to_hsv, rgb_to_hsv, Hsv};
pub use lab::{
    lab_to_rgb, lab_to_srgb8, linear_to_srgb, rescale, rgb_to_lab, srgb8_to_lab, srgb_to_linear,
    Lab, LabColorField,
};
