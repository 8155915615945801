use super::*;
use crate::classify::Classification;

const W: usize = 40;
const H: usize = 16;

/// Left half flat, right half one-pixel vertical stripes.
fn striped_field() -> Vec<f32> {
    (0..H)
        .flat_map(|_| (0..W).map(|x| if x < W / 2 || x % 2 == 0 { 1.0 } else { 0.0 }))
        .collect()
}

fn gray_raster(field: &[f32]) -> RasterImage {
    RasterImage::gray_from_unit(W as u32, H as u32, field, GraySource::SingleChannel)
}

#[test]
fn test_bank_kernels_are_zero_mean() {
    let bank = build_bank(&GaborParams::default());
    assert_eq!(bank.len(), 4);
    for kernel in &bank {
        assert_eq!(kernel.weights.len(), kernel.size() * kernel.size());
        let sum: f32 = kernel.weights.iter().sum();
        assert!(sum.abs() < 1e-3, "kernel sum {}", sum);
    }
    assert!((bank[1].orientation - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
}

#[test]
fn test_envelope_widths() {
    let (sx, sy) = envelope_sigmas(&GaborParams::default());
    assert!((sx - 0.785).abs() < 0.01, "sigma_x {}", sx);
    assert!((sy - sx / 0.3).abs() < 1e-4);
}

#[test]
fn test_filter_replicates_borders_on_flat_field() {
    let bank = build_bank(&GaborParams::default());
    let flat = vec![0.7f32; 9 * 5];
    let response = filter(&flat, 9, 5, &bank[0]);
    assert!(response.iter().all(|r| r.abs() < 1e-3));
}

#[test]
fn test_otsu_splits_bimodal_data() {
    let mut data = vec![0.1f32; 50];
    data.extend(vec![0.9f32; 50]);
    let result = otsu_threshold(&data);

    assert!(result.threshold >= 0.1 && result.threshold < 0.9);
    assert!(!result.is_above(0.1));
    assert!(result.is_above(0.9));
    assert!((result.below_ratio - 0.5).abs() < 1e-6);
}

#[test]
fn test_otsu_tie_takes_middle_of_gap() {
    // Buckets 25 and 229; every split in between has the same variance
    let mut data = vec![0.1f32; 30];
    data.extend(vec![0.9f32; 30]);
    let result = otsu_threshold(&data);

    assert_eq!(result.bucket, (25 + 228) / 2);
    assert!((result.threshold - 0.5).abs() < 0.01);
}

#[test]
fn test_segment_marks_flat_region_as_background() {
    let field = striped_field();
    let raster = gray_raster(&field);
    let mask = segment(
        &raster,
        &field,
        &MaskSettings::default(),
        &GaborParams::default(),
    );

    assert_eq!(mask.background.len(), W * H);
    for y in [0, H / 2, H - 1] {
        assert!(mask.is_background(y * W + 2), "flat pixel at row {}", y);
        assert!(!mask.is_background(y * W + 32), "textured pixel at row {}", y);
    }
}

#[test]
fn test_dark_background_flips_input_not_texture() {
    let field = striped_field();
    let raster = gray_raster(&field);
    let settings = MaskSettings {
        background: Background::Dark,
        ..MaskSettings::default()
    };
    let light = segment(&raster, &field, &MaskSettings::default(), &GaborParams::default());
    let dark = segment(&raster, &field, &settings, &GaborParams::default());
    for x in [2, 32] {
        let i = H / 2 * W + x;
        assert_eq!(light.is_background(i), dark.is_background(i));
    }
}

#[test]
fn test_deshadow_keeps_polarity() {
    // Gray on the left, alternating red and green columns on the right
    let mut data = Vec::with_capacity(W * H * 3);
    for _ in 0..H {
        for x in 0..W {
            let px = if x < W / 2 {
                [128, 128, 128]
            } else if x % 2 == 0 {
                [200, 40, 40]
            } else {
                [40, 200, 40]
            };
            data.extend_from_slice(&px);
        }
    }
    let raster = RasterImage {
        width: W as u32,
        height: H as u32,
        data,
        classification: Classification::Color,
    };
    let field = LabColorField::from_rgb8(raster.width, raster.height, &raster.data)
        .normalized_lightness();
    let settings = MaskSettings {
        enabled: true,
        deshadow: true,
        ..MaskSettings::default()
    };

    let mask = segment(&raster, &field, &settings, &GaborParams::default());

    assert!(!mask.is_background(H / 2 * W + 2));
    assert!(mask.is_background(H / 2 * W + 32));
}

#[test]
fn test_deshadow_ignored_for_grayscale() {
    let field = striped_field();
    let raster = gray_raster(&field);
    let settings = MaskSettings {
        enabled: true,
        deshadow: true,
        ..MaskSettings::default()
    };

    let plain = segment(&raster, &field, &MaskSettings::default(), &GaborParams::default());
    let deshadowed = segment(&raster, &field, &settings, &GaborParams::default());

    assert_eq!(plain, deshadowed);
    assert!(deshadowed.is_background(H / 2 * W + 2));
    assert!(!deshadowed.is_background(H / 2 * W + 32));
}

#[test]
fn test_mask_raster_is_white_background() {
    let mask = BackgroundMask {
        width: 2,
        height: 1,
        background: vec![true, false],
    };
    let raster = mask.to_raster();
    assert_eq!(raster.data, vec![255, 0]);
    assert_eq!(mask.background_ratio(), 0.5);
}
