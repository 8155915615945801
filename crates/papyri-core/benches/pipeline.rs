//! Benchmarks for papyri-core enhancement operations
//!
//! Run with: cargo bench -p papyri-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use papyri_core::classify::{Classification, RasterImage};
use papyri_core::color::LabColorField;
use papyri_core::enhance::{adaptive_contrast, vividness};
use papyri_core::models::{ClaheParams, GaborParams, MaskSettings};
use papyri_core::segment::segment;

/// Synthetic papyrus: warm background with dark vertical strokes
fn generate_test_fragment(width: u32, height: u32) -> RasterImage {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let stroke = (x / 3) % 7 == 0 && (y / 11) % 3 != 0;
            let px = if stroke {
                [60, 45, 30]
            } else {
                [
                    (190 + (x % 13)) as u8,
                    (160 + (y % 11)) as u8,
                    (120 + ((x + y) % 9)) as u8,
                ]
            };
            data.extend_from_slice(&px);
        }
    }
    RasterImage {
        width,
        height,
        data,
        classification: Classification::Color,
    }
}

fn bench_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation");
    group.sample_size(10);

    for size in [128u32, 256, 512].iter() {
        let image = generate_test_fragment(*size, *size);
        let field = LabColorField::from_rgb8(image.width, image.height, &image.data)
            .normalized_lightness();
        group.throughput(Throughput::Elements((*size * *size) as u64));

        group.bench_with_input(
            BenchmarkId::new("gabor_otsu", format!("{}x{}", size, size)),
            &(image, field),
            |b, (image, field)| {
                b.iter(|| {
                    segment(
                        black_box(image),
                        black_box(field),
                        &MaskSettings::default(),
                        &GaborParams::default(),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("operators");

    for size in [256u32, 512, 1024].iter() {
        let image = generate_test_fragment(*size, *size);
        let lab = LabColorField::from_rgb8(image.width, image.height, &image.data);
        let field = lab.normalized_lightness();
        group.throughput(Throughput::Elements((*size * *size) as u64));

        group.bench_with_input(
            BenchmarkId::new("adapthisteq", format!("{}x{}", size, size)),
            &field,
            |b, field| {
                b.iter(|| {
                    adaptive_contrast(
                        black_box(field),
                        *size as usize,
                        *size as usize,
                        &ClaheParams::default(),
                    )
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("vividness", format!("{}x{}", size, size)),
            &lab,
            |b, lab| b.iter(|| vividness(black_box(lab))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_segmentation, bench_operators);
criterion_main!(benches);
