use std::fs::File;

use ::tiff::decoder::Decoder;
use ::tiff::tags::Tag;
use tempfile::tempdir;

use super::*;
use crate::classify::{Classification, GraySource};

fn color_image() -> RasterImage {
    RasterImage {
        width: 3,
        height: 2,
        data: (0..18).map(|i| (i * 14) as u8).collect(),
        classification: Classification::Color,
    }
}

#[test]
fn test_output_name_plain_and_masked() {
    let name = OutputName::new(Path::new("/scans/P.Oxy 1234.TIF"), false);
    assert_eq!(
        name.variant("Vividness Negative", None),
        "P.Oxy 1234_tif-Vividness_Negative"
    );

    let red = OutputName::new(Path::new("frag.png"), true);
    assert_eq!(
        red.variant("Adapthisteq", Some((Background::Dark, true))),
        "frag_png_red-Adapthisteq-masked-darkbg-deshadow"
    );
    assert_eq!(
        red.variant(MASK_LABEL, Some((Background::Light, false))),
        "frag_png_red-mask-masked-lightbg"
    );
}

#[test]
fn test_tiff_carries_icc_profile() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.tif");
    let icc = srgb_icc_bytes().unwrap();

    export_tiff8(&color_image(), &path, Some(&icc)).unwrap();

    let mut decoder = Decoder::new(File::open(&path).unwrap()).unwrap();
    let embedded = decoder
        .get_tag_u8_vec(Tag::Unknown(TAG_ICC_PROFILE))
        .unwrap();
    assert_eq!(embedded, icc);

    let back = image::open(&path).unwrap().to_rgb8();
    assert_eq!(back.into_raw(), color_image().data);
}

#[test]
fn test_grayscale_tiff_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gray.tif");
    let image = RasterImage::gray_from_unit(2, 2, &[0.0, 0.25, 0.5, 1.0], GraySource::RedChannel);

    export_tiff8(&image, &path, None).unwrap();

    let back = image::open(&path).unwrap();
    assert_eq!(back.color(), image::ColorType::L8);
    assert_eq!(back.to_luma8().into_raw(), image.data);
}

#[test]
fn test_file_sink_writes_all_formats() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("enhanced").join("frag_tif-Vividness");
    let mut sink = FileSink::new(vec![OutputFormat::Tiff, OutputFormat::Jpeg], 85)
        .with_exiftool(dir.path().join("missing-exiftool"));

    let statuses = sink.write(&color_image(), &base).unwrap();

    assert!(dir.path().join("enhanced/frag_tif-Vividness.tif").is_file());
    assert!(dir.path().join("enhanced/frag_tif-Vividness.jpg").is_file());
    // exiftool is unavailable: the JPEG is kept and the failure reported
    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].contains("ICC profile not embedded"), "{}", statuses[0]);
}

#[test]
fn test_file_sink_without_icc_reports_tiff_status() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("x-mask");
    let mut sink = FileSink::new(vec![OutputFormat::Tiff], 90).without_icc();

    let statuses = sink.write(&color_image(), &base).unwrap();
    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].contains("without ICC profile"));
}

#[test]
fn test_jpeg_sink_leaves_only_variants_behind() {
    let dir = tempdir().unwrap();
    let mut sink = FileSink::new(vec![OutputFormat::Jpeg], 90)
        .with_exiftool(dir.path().join("missing-exiftool"));
    sink.write(&color_image(), &dir.path().join("out")).unwrap();
    drop(sink);

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["out.jpg".to_string()]);
}

#[test]
fn test_grayscale_outputs_skip_rgb_profile() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("gray-mask");
    let image = RasterImage::gray_from_unit(2, 2, &[0.0, 1.0, 1.0, 0.0], GraySource::SingleChannel);
    let mut sink = FileSink::new(vec![OutputFormat::Tiff, OutputFormat::Jpeg], 90)
        .with_exiftool(dir.path().join("missing-exiftool"));

    let statuses = sink.write(&image, &base).unwrap();
    // no exiftool run, so no failure to report
    assert!(statuses.is_empty(), "{:?}", statuses);

    let file = File::open(dir.path().join("gray-mask.tif")).unwrap();
    let mut decoder = Decoder::new(file).unwrap();
    assert!(decoder.get_tag_u8_vec(Tag::Unknown(TAG_ICC_PROFILE)).is_err());
}

#[test]
fn test_jpeg_quality_out_of_range_is_clamped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("q.jpg");
    export_jpeg(&color_image(), &path, 400).unwrap();
    export_jpeg(&color_image(), &path, -3).unwrap();
    assert!(image::open(&path).is_ok());
}
