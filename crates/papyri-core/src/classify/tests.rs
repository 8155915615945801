use super::*;

fn decoded(width: u32, height: u32, channels: u8, data: Vec<u8>) -> DecodedImage {
    DecodedImage {
        width,
        height,
        data,
        channels,
    }
}

#[test]
fn test_identical_channels_collapse_bit_identical() {
    let plane = [0u8, 17, 128, 200, 255, 3];
    let data: Vec<u8> = plane.iter().flat_map(|&v| [v, v, v]).collect();

    let raster = classify(decoded(3, 2, 3, data), false).unwrap();

    assert_eq!(
        raster.classification,
        Classification::Grayscale(GraySource::CollapsedChannels)
    );
    assert_eq!(raster.channels(), 1);
    assert_eq!(raster.data, plane);
}

#[test]
fn test_two_channels_padded_to_color() {
    // Identical first two planes must not trigger the collapse
    let data = vec![10, 10, 20, 20, 30, 30, 40, 40];
    let raster = classify(decoded(2, 2, 2, data), false).unwrap();

    assert_eq!(raster.classification, Classification::Color);
    assert_eq!(
        raster.data,
        vec![10, 10, 0, 20, 20, 0, 30, 30, 0, 40, 40, 0]
    );
}

#[test]
fn test_alpha_dropped_before_classification() {
    let data = vec![5, 5, 5, 255, 9, 9, 9, 0];
    let raster = classify(decoded(2, 1, 4, data), false).unwrap();
    assert_eq!(raster.data, vec![5, 9]);
    assert!(raster.classification.is_grayscale());

    let data = vec![1, 2, 3, 255, 4, 5, 6, 255];
    let raster = classify(decoded(2, 1, 4, data), false).unwrap();
    assert_eq!(raster.classification, Classification::Color);
    assert_eq!(raster.data, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_single_channel_is_grayscale() {
    let raster = classify(decoded(2, 1, 1, vec![0, 255]), true).unwrap();
    assert_eq!(
        raster.classification,
        Classification::Grayscale(GraySource::SingleChannel)
    );
    assert_eq!(raster.class(), ImageClass::Grayscale);
}

#[test]
fn test_red_only_keeps_first_channel() {
    let data = vec![200, 10, 20, 100, 50, 60];
    let raster = classify(decoded(2, 1, 3, data), true).unwrap();

    assert!(raster.classification.is_red_channel());
    assert_eq!(raster.data, vec![200, 100]);
}

#[test]
fn test_red_only_leaves_collapsed_gray_alone() {
    let data = vec![7, 7, 7, 8, 8, 8];
    let raster = classify(decoded(2, 1, 3, data), true).unwrap();
    assert_eq!(
        raster.classification,
        Classification::Grayscale(GraySource::CollapsedChannels)
    );
}

#[test]
fn test_rejects_zero_channels_and_short_buffers() {
    assert!(matches!(
        classify(decoded(1, 1, 0, vec![]), false),
        Err(EnhanceError::UnsupportedChannels(0))
    ));
    assert!(matches!(
        classify(decoded(2, 2, 3, vec![0; 11]), false),
        Err(EnhanceError::InvalidDimensions { len: 11, .. })
    ));
}

#[test]
fn test_gray_unit_conversion() {
    let raster =
        RasterImage::gray_from_unit(3, 1, &[0.0, 0.5, f32::NAN], GraySource::SingleChannel);
    assert_eq!(raster.data, vec![0, 128, 0]);
    let unit = raster.gray_unit();
    assert!((unit[1] - 128.0 / 255.0).abs() < 1e-6);
}
