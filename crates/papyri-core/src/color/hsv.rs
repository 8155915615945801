//! HSV (Hue-Saturation-Value) conversion

/// HSV color representation
/// - H (hue): 0.0-360.0 degrees
/// - S (saturation): 0.0-1.0
/// - V (value): 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// Convert RGB to HSV
///
/// Input: RGB values in range 0.0-1.0
/// Output: HSV where H is 0.0-360.0, S and V are 0.0-1.0
#[inline]
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> Hsv {
    let r = r.clamp(0.0, 1.0);
    let g = g.clamp(0.0, 1.0);
    let b = b.clamp(0.0, 1.0);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    // Achromatic case
    if delta < 1e-6 || max <= 0.0 {
        return Hsv {
            h: 0.0,
            s: 0.0,
            v: max,
        };
    }

    let s = delta / max;

    let h = if (max - r).abs() < 1e-6 {
        let mut h = (g - b) / delta;
        if g < b {
            h += 6.0;
        }
        h * 60.0
    } else if (max - g).abs() < 1e-6 {
        ((b - r) / delta + 2.0) * 60.0
    } else {
        ((r - g) / delta + 4.0) * 60.0
    };

    Hsv {
        h: h % 360.0,
        s,
        v: max,
    }
}

/// Convert interleaved 8-bit RGB to HSV
pub fn rgb8_array_to_hsv(data: &[u8]) -> Vec<Hsv> {
    data.chunks_exact(3)
        .map(|rgb| {
            rgb_to_hsv(
                rgb[0] as f32 / 255.0,
                rgb[1] as f32 / 255.0,
                rgb[2] as f32 / 255.0,
            )
        })
        .collect()
}
