use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, Luma, Rgb, RgbImage};
use tempfile::tempdir;

use super::*;
use crate::classify::RasterImage;
use crate::models::OutputFormat;

/// Keeps every written image in memory.
#[derive(Default)]
struct MemorySink {
    written: Vec<(PathBuf, RasterImage)>,
}

impl ImageSink for MemorySink {
    fn write(&mut self, image: &RasterImage, base: &Path) -> Result<Vec<String>> {
        self.written.push((base.to_path_buf(), image.clone()));
        Ok(vec![])
    }
}

impl MemorySink {
    fn names(&self) -> Vec<String> {
        self.written
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}

fn write_color(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(12, 10, |x, y| Rgb([(x * 20) as u8, (y * 25) as u8, 90]))
        .save(&path)
        .unwrap();
    path
}

fn write_gray(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    GrayImage::from_fn(12, 10, |x, y| Luma([((x + y) * 12) as u8]))
        .save(&path)
        .unwrap();
    path
}

fn request(vividness: bool, adaptive: bool, negative: bool) -> EnhancementRequest {
    let mut request = EnhancementRequest::default();
    request.operators.vividness = vividness;
    request.operators.adaptive_contrast = adaptive;
    request.postprocessing.negative = negative;
    request.output.formats = vec![OutputFormat::Tiff];
    request
}

#[test]
fn test_unreadable_input_is_logged_and_skipped() {
    let dir = tempdir().unwrap();
    let mut paths: Vec<PathBuf> = (1..=5)
        .map(|i| write_color(dir.path(), &format!("p{}.png", i)))
        .collect();
    paths[2] = dir.path().join("p3.png");
    fs::write(&paths[2], b"not a png").unwrap();

    let mut req = request(true, false, false);
    req.output.retain_all = true;
    let mut sink = MemorySink::default();
    let outcome = BatchRunner::new(req, &mut sink).run(&paths).unwrap();

    assert_eq!(outcome.unreadable.len(), 1);
    assert_eq!(outcome.unreadable[0].position, 3);
    assert_eq!(outcome.unreadable[0].path, paths[2]);
    assert_eq!(outcome.processed, 4);
    assert_eq!(outcome.outputs.len(), 4);
    assert_eq!(outcome.first.as_ref().unwrap().source, paths[0]);
    assert!(!outcome.aborted);

    let log = fs::read_to_string(dir.path().join("enhanced").join(ERROR_LOG_NAME)).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.starts_with("3\t"));
}

#[test]
fn test_vividness_negative_on_one_color_image() {
    let dir = tempdir().unwrap();
    let path = write_color(dir.path(), "frag.png");

    let mut sink = MemorySink::default();
    let outcome = BatchRunner::new(request(true, false, true), &mut sink)
        .run(&[&path])
        .unwrap();

    let first = outcome.first.unwrap();
    assert_eq!(first.labels(), vec!["Original", "Vividness", "Vividness Negative"]);
    assert_eq!(first.indices(), vec![0, 1, 2]);
    assert_eq!(
        sink.names(),
        vec!["frag_png-Vividness", "frag_png-Vividness_Negative"]
    );
    assert!(sink.written[0].0.starts_with(dir.path().join("enhanced")));
    // Without retention only the first set is kept
    assert!(outcome.outputs.is_empty());
}

#[test]
fn test_grayscale_with_color_only_methods_warns() {
    let dir = tempdir().unwrap();
    let path = write_gray(dir.path(), "gray.png");

    let mut sink = MemorySink::default();
    let outcome = BatchRunner::new(request(true, true, true), &mut sink)
        .run(&[&path])
        .unwrap();

    let first = outcome.first.unwrap();
    assert_eq!(
        first.labels(),
        vec!["Original", "Adapthisteq", "Adapthisteq Negative"]
    );
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(
        outcome.warnings[0],
        Warning::GrayscaleUnsupported {
            path: path.clone(),
            methods: vec!["Vividness".to_string()],
        }
    );
}

#[test]
fn test_no_method_selected_fails_before_any_input() {
    let dir = tempdir().unwrap();
    let path = write_color(dir.path(), "a.png");

    let mut sink = MemorySink::default();
    let result = BatchRunner::new(request(false, false, true), &mut sink).run(&[&path]);

    assert!(matches!(result, Err(EnhanceError::Config(_))));
    assert!(sink.written.is_empty());
}

#[test]
fn test_abort_stops_the_batch() {
    let dir = tempdir().unwrap();
    let paths = vec![write_color(dir.path(), "a.png"), write_color(dir.path(), "b.png")];
    let token = CancellationToken::new();
    token.cancel();

    let mut sink = MemorySink::default();
    let outcome = BatchRunner::new(request(true, true, false), &mut sink)
        .with_cancellation(token, AbortOnCancel)
        .run(&paths)
        .unwrap();

    assert!(outcome.aborted);
    assert_eq!(outcome.processed, 0);
    assert!(outcome.first.is_none());
    // The variant written before the check stays on disk
    assert_eq!(sink.written.len(), 1);
}

#[test]
fn test_resume_clears_the_request() {
    let dir = tempdir().unwrap();
    let path = write_color(dir.path(), "a.png");
    let token = CancellationToken::new();
    token.cancel();
    let mut asked = 0;

    let mut sink = MemorySink::default();
    let outcome = BatchRunner::new(request(true, true, false), &mut sink)
        .with_cancellation(token.clone(), || {
            asked += 1;
            CancelDecision::Resume
        })
        .run(&[&path])
        .unwrap();

    assert!(!outcome.aborted);
    assert_eq!(outcome.processed, 1);
    assert!(!token.is_cancelled());
    assert_eq!(asked, 1);
}

#[test]
fn test_clean_batch_removes_stale_error_log() {
    let dir = tempdir().unwrap();
    let path = write_color(dir.path(), "a.png");
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join(ERROR_LOG_NAME), "1\told.png\tgone\n").unwrap();

    let mut sink = MemorySink::default();
    BatchRunner::new(request(true, false, false), &mut sink)
        .with_output_dir(&out)
        .run(&[&path])
        .unwrap();

    assert!(!out.join(ERROR_LOG_NAME).exists());
}

#[test]
fn test_aborted_batch_keeps_previous_error_log() {
    let dir = tempdir().unwrap();
    let path = write_color(dir.path(), "a.png");
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join(ERROR_LOG_NAME), "1\told.png\tgone\n").unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let mut sink = MemorySink::default();
    let outcome = BatchRunner::new(request(true, false, false), &mut sink)
        .with_output_dir(&out)
        .with_cancellation(token, AbortOnCancel)
        .run(&[&path])
        .unwrap();

    assert!(outcome.aborted);
    assert!(out.join(ERROR_LOG_NAME).is_file());
}

#[test]
fn test_cancellation_checked_for_skipped_variants() {
    let dir = tempdir().unwrap();
    let path = write_color(dir.path(), "a.png");
    let mut req = request(false, false, true);
    req.operators.retinex = vec!["MSR".to_string()];
    let token = CancellationToken::new();
    token.cancel();
    let mut asked = 0;

    // No retinex program: the first step is skipped and still checks the token
    let mut sink = MemorySink::default();
    let outcome = BatchRunner::new(req, &mut sink)
        .with_cancellation(token, || {
            asked += 1;
            CancelDecision::Abort
        })
        .run(&[&path])
        .unwrap();

    assert!(outcome.aborted);
    assert_eq!(asked, 1);
    assert!(sink.written.is_empty());
    assert_eq!(outcome.warnings.len(), 1);
}

#[test]
fn test_cancellation_checked_for_image_without_variants() {
    let dir = tempdir().unwrap();
    let paths = vec![write_gray(dir.path(), "g.png"), write_color(dir.path(), "c.png")];
    let token = CancellationToken::new();
    token.cancel();

    // Vividness alone has nothing to run on a grayscale image
    let mut sink = MemorySink::default();
    let outcome = BatchRunner::new(request(true, false, false), &mut sink)
        .with_cancellation(token, AbortOnCancel)
        .run(&paths)
        .unwrap();

    assert!(outcome.aborted);
    assert_eq!(outcome.processed, 0);
    assert!(sink.written.is_empty());
}

#[test]
fn test_mask_is_written_and_masked_variants_named() {
    let dir = tempdir().unwrap();
    let path = write_color(dir.path(), "m.png");
    let mut req = request(true, false, false);
    req.mask.enabled = true;

    let mut sink = MemorySink::default();
    let outcome = BatchRunner::new(req, &mut sink).run(&[&path]).unwrap();

    assert_eq!(
        sink.names(),
        vec!["m_png-mask-masked-lightbg", "m_png-Vividness-masked-lightbg"]
    );
    assert_eq!(sink.written[0].1.channels(), 1);
    assert_eq!(
        outcome.first.unwrap().labels(),
        vec!["Original", "Vividness Masked"]
    );
}

#[test]
fn test_missing_profiles_disable_gamut_once() {
    let dir = tempdir().unwrap();
    let paths = vec![write_color(dir.path(), "a.png"), write_color(dir.path(), "b.png")];

    let mut sink = MemorySink::default();
    let outcome = BatchRunner::new(request(true, false, false), &mut sink)
        .with_gamut_expansion(Some(dir.path().join("no-profiles")))
        .run(&paths)
        .unwrap();

    let disabled = outcome
        .warnings
        .iter()
        .filter(|w| matches!(w, Warning::GamutExpansionDisabled { .. }))
        .count();
    assert_eq!(disabled, 1);
    assert_eq!(outcome.processed, 2);
}
