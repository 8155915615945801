//! LAB (CIE L*a*b*) conversions for 8-bit sRGB rasters

use std::sync::OnceLock;

use rayon::prelude::*;

/// LAB color representation (CIE L*a*b*)
/// - L: 0.0-100.0 (lightness)
/// - a: approximately -128 to +128 (green-red axis)
/// - b: approximately -128 to +128 (blue-yellow axis)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

/// D65 standard illuminant reference white point
pub(crate) const D65_X: f32 = 0.95047;
pub(crate) const D65_Y: f32 = 1.00000;
pub(crate) const D65_Z: f32 = 1.08883;

/// sRGB to XYZ matrix (D65)
pub(crate) const SRGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.119_192, 0.9503041],
];

/// XYZ to sRGB matrix (D65)
pub(crate) const XYZ_TO_SRGB: [[f32; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.969_266, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

#[inline]
fn mul3(m: &[[f32; 3]; 3], x: f32, y: f32, z: f32) -> (f32, f32, f32) {
    (
        m[0][0] * x + m[0][1] * y + m[0][2] * z,
        m[1][0] * x + m[1][1] * y + m[1][2] * z,
        m[2][0] * x + m[2][1] * y + m[2][2] * z,
    )
}

/// LAB f(t) function
#[inline]
fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    const DELTA_CUBED: f32 = DELTA * DELTA * DELTA; // ~0.008856

    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

/// LAB f^-1(t) inverse function
#[inline]
fn lab_f_inv(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;

    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

/// sRGB transfer function, encoded (0.0-1.0) to linear
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB transfer function, linear to encoded (0.0-1.0)
#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn srgb8_decode_lut() -> &'static [f32; 256] {
    static LUT: OnceLock<[f32; 256]> = OnceLock::new();
    LUT.get_or_init(|| {
        let mut lut = [0.0f32; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            *entry = srgb_to_linear(i as f32 / 255.0);
        }
        lut
    })
}

/// Convert linear sRGB to CIE LAB (D65 illuminant)
///
/// Input: Linear RGB values in range 0.0-1.0
/// Output: LAB where L is 0-100, a and b are approximately -128 to +128
#[inline]
pub fn rgb_to_lab(r: f32, g: f32, b: f32) -> Lab {
    let (x, y, z) = mul3(&SRGB_TO_XYZ, r.max(0.0), g.max(0.0), b.max(0.0));

    let fx = lab_f(x / D65_X);
    let fy = lab_f(y / D65_Y);
    let fz = lab_f(z / D65_Z);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Convert CIE LAB to linear sRGB (D65 illuminant)
///
/// Output may fall outside 0.0-1.0 for out-of-gamut colors.
#[inline]
pub fn lab_to_rgb(lab: Lab) -> (f32, f32, f32) {
    let Lab { l, a, b } = lab;

    let fy = (l + 16.0) / 116.0;
    let fx = a / 500.0 + fy;
    let fz = fy - b / 200.0;

    let x = D65_X * lab_f_inv(fx);
    let y = D65_Y * lab_f_inv(fy);
    let z = D65_Z * lab_f_inv(fz);

    mul3(&XYZ_TO_SRGB, x, y, z)
}

/// Convert one 8-bit sRGB pixel to LAB.
#[inline]
pub fn srgb8_to_lab(r: u8, g: u8, b: u8) -> Lab {
    let lut = srgb8_decode_lut();
    rgb_to_lab(lut[r as usize], lut[g as usize], lut[b as usize])
}

/// Convert LAB to an 8-bit sRGB pixel, clipping out-of-gamut values.
#[inline]
pub fn lab_to_srgb8(lab: Lab) -> [u8; 3] {
    let (r, g, b) = lab_to_rgb(lab);
    [quantize(r), quantize(g), quantize(b)]
}

#[inline]
fn quantize(linear: f32) -> u8 {
    let encoded = linear_to_srgb(linear.max(0.0)).clamp(0.0, 1.0);
    (encoded * 255.0).round() as u8
}

/// Min-max rescale to 0.0-1.0. Constant input maps to all zeros.
///
/// NaN samples are ignored when computing the range and map to 0.0.
pub fn rescale(values: &[f32]) -> Vec<f32> {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    if !range.is_finite() || range <= f32::EPSILON {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|&v| if v.is_finite() { (v - min) / range } else { 0.0 })
        .collect()
}

/// CIELAB decomposition of a color raster, one plane per component.
#[derive(Debug, Clone)]
pub struct LabColorField {
    pub width: u32,
    pub height: u32,
    pub l: Vec<f32>,
    pub a: Vec<f32>,
    pub b: Vec<f32>,
}

impl LabColorField {
    /// Decompose interleaved 8-bit sRGB samples.
    pub fn from_rgb8(width: u32, height: u32, data: &[u8]) -> Self {
        let labs: Vec<Lab> = data
            .par_chunks_exact(3)
            .map(|px| srgb8_to_lab(px[0], px[1], px[2]))
            .collect();
        Self::from_labs(width, height, &labs)
    }

    /// Decompose interleaved floating point sRGB samples (0.0-1.0, encoded).
    pub fn from_rgb_f32(width: u32, height: u32, data: &[f32]) -> Self {
        let labs: Vec<Lab> = data
            .par_chunks_exact(3)
            .map(|px| {
                rgb_to_lab(
                    srgb_to_linear(px[0].clamp(0.0, 1.0)),
                    srgb_to_linear(px[1].clamp(0.0, 1.0)),
                    srgb_to_linear(px[2].clamp(0.0, 1.0)),
                )
            })
            .collect();
        Self::from_labs(width, height, &labs)
    }

    fn from_labs(width: u32, height: u32, labs: &[Lab]) -> Self {
        let mut l = Vec::with_capacity(labs.len());
        let mut a = Vec::with_capacity(labs.len());
        let mut b = Vec::with_capacity(labs.len());
        for lab in labs {
            l.push(lab.l);
            a.push(lab.a);
            b.push(lab.b);
        }
        Self {
            width,
            height,
            l,
            a,
            b,
        }
    }

    pub fn len(&self) -> usize {
        self.l.len()
    }

    pub fn is_empty(&self) -> bool {
        self.l.is_empty()
    }

    /// Lightness min-max rescaled to 0.0-1.0.
    pub fn normalized_lightness(&self) -> Vec<f32> {
        rescale(&self.l)
    }

    /// Rebuild 8-bit sRGB from a substitute lightness (0.0-1.0) and chroma planes.
    pub fn compose_rgb8(lightness: &[f32], a: &[f32], b: &[f32]) -> Vec<u8> {
        let mut out = vec![0u8; lightness.len() * 3];
        out.par_chunks_exact_mut(3)
            .enumerate()
            .for_each(|(i, px)| {
                let lab = Lab {
                    l: lightness[i] * 100.0,
                    a: a[i],
                    b: b[i],
                };
                px.copy_from_slice(&lab_to_srgb8(lab));
            });
        out
    }
}
