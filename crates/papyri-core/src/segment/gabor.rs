//! Even-symmetric Gabor filter bank

use std::f32::consts::PI;

use rayon::prelude::*;

use crate::models::GaborParams;

/// A square, zero-mean, even-symmetric Gabor kernel.
#[derive(Debug, Clone)]
pub struct GaborKernel {
    pub orientation: f32,
    pub radius: usize,
    pub weights: Vec<f32>,
}

impl GaborKernel {
    pub fn size(&self) -> usize {
        2 * self.radius + 1
    }
}

/// Envelope widths (across, along) the carrier for a wavelength and octave bandwidth.
pub fn envelope_sigmas(params: &GaborParams) -> (f32, f32) {
    let b = 2f32.powf(params.bandwidth);
    let sigma_x = params.wavelength / PI * (std::f32::consts::LN_2 / 2.0).sqrt() * (b + 1.0)
        / (b - 1.0);
    (sigma_x, sigma_x / params.aspect_ratio)
}

/// Build the bank, one kernel per orientation evenly spaced over 180 degrees.
pub fn build_bank(params: &GaborParams) -> Vec<GaborKernel> {
    let (sigma_x, sigma_y) = envelope_sigmas(params);
    let radius = (3.0 * sigma_x.max(sigma_y)).ceil().max(1.0) as usize;
    let size = 2 * radius + 1;
    let orientations = params.orientations.max(1);

    (0..orientations)
        .map(|k| {
            let theta = PI * k as f32 / orientations as f32;
            let (sin_t, cos_t) = theta.sin_cos();
            let mut weights = Vec::with_capacity(size * size);
            for ky in 0..size {
                let y = ky as f32 - radius as f32;
                for kx in 0..size {
                    let x = kx as f32 - radius as f32;
                    let xr = x * cos_t + y * sin_t;
                    let yr = -x * sin_t + y * cos_t;
                    let envelope = (-(xr * xr / (2.0 * sigma_x * sigma_x)
                        + yr * yr / (2.0 * sigma_y * sigma_y)))
                        .exp();
                    weights.push(envelope * (2.0 * PI * xr / params.wavelength).cos());
                }
            }
            let mean = weights.iter().sum::<f32>() / weights.len() as f32;
            weights.iter_mut().for_each(|w| *w -= mean);

            GaborKernel {
                orientation: theta,
                radius,
                weights,
            }
        })
        .collect()
}

/// Correlate a single-channel field with one kernel, replicating edge samples.
pub fn filter(field: &[f32], width: usize, height: usize, kernel: &GaborKernel) -> Vec<f32> {
    let mut out = vec![0.0f32; field.len()];
    if width == 0 || height == 0 {
        return out;
    }
    let r = kernel.radius as isize;
    let size = kernel.size();

    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, value) in row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for ky in 0..size {
                let sy = (y as isize + ky as isize - r).clamp(0, height as isize - 1) as usize;
                let src_row = &field[sy * width..(sy + 1) * width];
                let weights = &kernel.weights[ky * size..(ky + 1) * size];
                for (kx, w) in weights.iter().enumerate() {
                    let sx = (x as isize + kx as isize - r).clamp(0, width as isize - 1) as usize;
                    acc += w * src_row[sx];
                }
            }
            *value = acc;
        }
    });
    out
}

/// Per-pixel maximum of the absolute responses across the bank.
pub fn magnitude(field: &[f32], width: usize, height: usize, bank: &[GaborKernel]) -> Vec<f32> {
    let mut combined = vec![0.0f32; field.len()];
    for kernel in bank {
        let response = filter(field, width, height, kernel);
        combined
            .par_iter_mut()
            .zip(response.par_iter())
            .for_each(|(acc, r)| *acc = acc.max(r.abs()));
    }
    combined
}
