use std::fs;
use std::path::PathBuf;

use image::{Rgb, RgbImage};
use tempfile::tempdir;

use papyri_core::batch::UnreadableInput;
use papyri_core::config::load_config;
use papyri_core::{BatchOutcome, Warning};

use super::*;
use crate::builders::EnhanceOverrides;

#[test]
fn test_label_listing() {
    let labels = label_listing("gray", "sequential").unwrap();
    assert_eq!(labels.len(), 9);
    assert_eq!(labels[0], "Original");
    assert_eq!(labels[1], "Adapthisteq");
    assert_eq!(labels[2], "Retinex MSR");

    assert!(label_listing("sepia", "sequential").is_err());
    assert!(label_listing("color", "random").is_err());
}

#[test]
fn test_init_config_respects_force() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("papyri").join("papyri.yml");

    assert!(init_config_at(&path, false).unwrap());
    fs::write(&path, "color:\n  embed_icc: false\n").unwrap();

    assert!(!init_config_at(&path, false).unwrap());
    assert!(fs::read_to_string(&path).unwrap().contains("embed_icc: false"));

    assert!(init_config_at(&path, true).unwrap());
    let handle = load_config(Some(&path));
    assert!(handle.warnings.is_empty(), "{:?}", handle.warnings);
    assert!(handle.config.color.embed_icc);
}

#[test]
fn test_format_summary() {
    let outcome = BatchOutcome {
        processed: 2,
        unreadable: vec![UnreadableInput {
            path: PathBuf::from("scans/broken.tif"),
            position: 3,
            reason: "truncated".to_string(),
        }],
        warnings: vec![Warning::ConfigAdjusted("jpeg_quality 140 clamped to 100".into())],
        aborted: true,
        ..Default::default()
    };

    let text = format_summary(&outcome);

    assert!(text.starts_with("Processed: 2 image(s)\n"));
    assert!(text.contains("Unreadable: 1\n  #3 scans/broken.tif: truncated\n"));
    assert!(text.contains("jpeg_quality 140 clamped to 100"));
    assert!(!text.contains("ICC profile"));
    assert!(text.ends_with("Aborted before all inputs were processed\n"));
}

#[test]
fn test_enhance_writes_variants() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("frag.png");
    let image = RgbImage::from_fn(24, 24, |x, y| {
        Rgb([(x * 10) as u8, (y * 10) as u8, ((x + y) * 5) as u8])
    });
    image.save(&input).unwrap();

    let config = dir.path().join("papyri.yml");
    fs::write(&config, "color:\n  gamut_expansion: false\n  embed_icc: false\n").unwrap();
    let out = dir.path().join("out");

    let args = EnhanceArgs {
        inputs: vec![input],
        config: Some(config),
        out: Some(out.clone()),
        recursive: false,
        overrides: EnhanceOverrides {
            methods: Some("vividness".to_string()),
            negative: true,
            ..Default::default()
        },
    };
    cmd_enhance(args).unwrap();

    assert!(out.join("frag_png-Vividness.tif").is_file());
    assert!(out.join("frag_png-Vividness_Negative.tif").is_file());
    assert!(!out.join("frag_png-Adapthisteq.tif").exists());
}

#[test]
fn test_enhance_without_images_fails() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), b"x").unwrap();

    let args = EnhanceArgs {
        inputs: vec![dir.path().to_path_buf()],
        ..Default::default()
    };
    let err = cmd_enhance(args).unwrap_err();
    assert!(err.contains("No supported images"), "{}", err);
}
