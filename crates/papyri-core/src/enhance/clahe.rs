//! Contrast-limited adaptive histogram equalization with a Rayleigh target

use rayon::prelude::*;

use crate::color::rescale;
use crate::models::ClaheParams;

/// Equalize a single-channel field of samples in 0.0-1.0.
///
/// Each tile's clipped histogram is mapped onto a Rayleigh distribution and
/// the per-tile mappings are bilinearly interpolated between tile centers.
pub fn clahe(field: &[f32], width: usize, height: usize, params: &ClaheParams) -> Vec<f32> {
    if field.is_empty() || width == 0 || height == 0 {
        return field.to_vec();
    }
    let bins = params.bins.max(2);
    let tiles_x = (params.tiles_x.max(1) as usize).min(width);
    let tiles_y = (params.tiles_y.max(1) as usize).min(height);

    let bin_of = |v: f32| -> usize {
        let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        ((v * (bins - 1) as f32).round() as usize).min(bins - 1)
    };

    let x_edges: Vec<usize> = (0..=tiles_x).map(|i| i * width / tiles_x).collect();
    let y_edges: Vec<usize> = (0..=tiles_y).map(|j| j * height / tiles_y).collect();

    let maps: Vec<Vec<f32>> = (0..tiles_x * tiles_y)
        .into_par_iter()
        .map(|t| {
            let (tx, ty) = (t % tiles_x, t / tiles_x);
            let mut histogram = vec![0.0f32; bins];
            for y in y_edges[ty]..y_edges[ty + 1] {
                for &v in &field[y * width + x_edges[tx]..y * width + x_edges[tx + 1]] {
                    histogram[bin_of(v)] += 1.0;
                }
            }
            let pixels = ((x_edges[tx + 1] - x_edges[tx]) * (y_edges[ty + 1] - y_edges[ty])) as f32;
            clip_histogram(&mut histogram, clip_limit(pixels, bins, params.clip_limit));
            rayleigh_mapping(&histogram, pixels, params.alpha)
        })
        .collect();

    let centers_x: Vec<f32> = (0..tiles_x)
        .map(|i| (x_edges[i] + x_edges[i + 1]) as f32 / 2.0)
        .collect();
    let centers_y: Vec<f32> = (0..tiles_y)
        .map(|j| (y_edges[j] + y_edges[j + 1]) as f32 / 2.0)
        .collect();

    let mut out = vec![0.0f32; field.len()];
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let (y0, y1, wy) = neighbors(&centers_y, y as f32 + 0.5);
        for (x, value) in row.iter_mut().enumerate() {
            let (x0, x1, wx) = neighbors(&centers_x, x as f32 + 0.5);
            let bin = bin_of(field[y * width + x]);
            let top = maps[y0 * tiles_x + x0][bin] * (1.0 - wx) + maps[y0 * tiles_x + x1][bin] * wx;
            let bottom =
                maps[y1 * tiles_x + x0][bin] * (1.0 - wx) + maps[y1 * tiles_x + x1][bin] * wx;
            *value = top * (1.0 - wy) + bottom * wy;
        }
    });
    out
}

/// NaN-zeroed, rescaled, equalized and rescaled again.
pub fn adaptive_contrast(
    field: &[f32],
    width: usize,
    height: usize,
    params: &ClaheParams,
) -> Vec<f32> {
    let cleaned: Vec<f32> = field
        .iter()
        .map(|&v| if v.is_nan() { 0.0 } else { v })
        .collect();
    let equalized = clahe(&rescale(&cleaned), width, height, params);
    rescale(&equalized)
}

/// Absolute clip limit in pixel counts, never below a flat histogram.
fn clip_limit(pixels: f32, bins: usize, normalized: f32) -> f32 {
    let min_limit = (pixels / bins as f32).ceil();
    min_limit + (normalized.clamp(0.0, 1.0) * (pixels - min_limit)).round()
}

fn clip_histogram(histogram: &mut [f32], limit: f32) {
    let excess: f32 = histogram.iter().map(|&c| (c - limit).max(0.0)).sum();
    if excess <= 0.0 {
        return;
    }
    histogram.iter_mut().for_each(|c| *c = c.min(limit));

    // Spread the excess evenly, topping up bins that still have room
    let mut remaining = excess;
    for _ in 0..8 {
        let open = histogram.iter().filter(|&&c| c < limit).count();
        if open == 0 || remaining <= 1e-3 {
            break;
        }
        let share = remaining / open as f32;
        remaining = 0.0;
        for c in histogram.iter_mut().filter(|c| **c < limit) {
            let added = share.min(limit - *c);
            *c += added;
            remaining += share - added;
        }
    }
}

fn rayleigh_mapping(histogram: &[f32], pixels: f32, alpha: f32) -> Vec<f32> {
    let hconst = 2.0 * alpha * alpha;
    let vmax = 1.0 - (-1.0 / hconst).exp();
    let mut cumulative = 0.0f32;
    histogram
        .iter()
        .map(|&count| {
            cumulative += count;
            let mut val = vmax * (cumulative / pixels);
            if val >= 1.0 {
                val = 1.0 - f32::EPSILON;
            }
            (-hconst * (1.0 - val).ln()).sqrt().min(1.0)
        })
        .collect()
}

/// Indices of the tile centers bracketing `pos` and the weight of the second.
fn neighbors(centers: &[f32], pos: f32) -> (usize, usize, f32) {
    let last = centers.len() - 1;
    if pos <= centers[0] {
        return (0, 0, 0.0);
    }
    if pos >= centers[last] {
        return (last, last, 0.0);
    }
    let i = centers.iter().rposition(|&c| c <= pos).unwrap_or(0).min(last - 1);
    let span = centers[i + 1] - centers[i];
    let w = if span > 0.0 { (pos - centers[i]) / span } else { 0.0 };
    (i, i + 1, w)
}
