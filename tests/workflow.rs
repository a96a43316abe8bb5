//! Integration tests for the conversion workflow.
//!
//! Sources are generated in-process, so these run offline and need no
//! fixture files.

use edgequake_imgconv::{
    ConversionConfig, ConversionWorkflow, ConvertOutcome, ConvertedArtifact, DirectorySink,
    DownloadSink, ImgConvError, SourceFile, TargetFormat, WorkflowFailure, WorkflowState,
};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Route library logs to the test harness; `RUST_LOG=debug` shows them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn encoded(w: u32, h: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbaImage::from_fn(w, h, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]));
    let img = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8())
    } else {
        DynamicImage::ImageRgba8(img)
    };
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn png_source(name: &str, w: u32, h: u32) -> SourceFile {
    SourceFile::from_bytes(name, encoded(w, h, ImageFormat::Png))
}

fn converted(outcome: ConvertOutcome) -> ConvertedArtifact {
    match outcome {
        ConvertOutcome::Converted { artifact, .. } => artifact,
        ConvertOutcome::NoSourceSelected => panic!("expected a conversion"),
    }
}

/// Sink that records every save instead of touching the file system.
#[derive(Default)]
struct RecordingSink {
    saves: Mutex<Vec<(String, usize)>>,
}

impl DownloadSink for RecordingSink {
    fn save(&self, filename: &str, artifact: &ConvertedArtifact) -> Result<(), ImgConvError> {
        self.saves
            .lock()
            .unwrap()
            .push((filename.to_string(), artifact.byte_len()));
        Ok(())
    }
}

// ── Format tagging & dimensions ──────────────────────────────────────────────

#[tokio::test]
async fn every_target_format_is_tagged_and_keeps_dimensions() {
    init_tracing();
    for format in TargetFormat::ALL {
        let wf = ConversionWorkflow::new(ConversionConfig::default());
        wf.select_file(png_source("src.png", 37, 19));
        wf.select_target_format(format);

        let artifact = converted(wf.convert().await.unwrap());
        assert_eq!(artifact.format, format);

        let decoded = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (37, 19), "{format}");
        assert!(wf
            .preview()
            .unwrap()
            .starts_with(&format!("data:{};base64,", format.mime_type())));
    }
}

#[tokio::test]
async fn non_png_sources_convert() {
    for (source_format, name) in [
        (ImageFormat::Jpeg, "in.jpeg"),
        (ImageFormat::WebP, "in.webp"),
        (ImageFormat::Bmp, "in.bmp"),
        (ImageFormat::Gif, "in.gif"),
    ] {
        let wf = ConversionWorkflow::new(ConversionConfig::default());
        wf.select_file(SourceFile::from_bytes(name, encoded(16, 9, source_format)));
        let artifact = converted(wf.convert().await.unwrap());
        assert_eq!(artifact.format, TargetFormat::Png);
        assert_eq!((artifact.width, artifact.height), (16, 9), "{name}");
    }
}

// ── State transitions ────────────────────────────────────────────────────────

#[tokio::test]
async fn selecting_a_new_file_clears_the_artifact() {
    let wf = ConversionWorkflow::new(ConversionConfig::default());
    wf.select_file(png_source("a.png", 4, 4));
    wf.convert().await.unwrap();
    assert!(wf.preview().is_some());

    wf.select_file(png_source("b.png", 8, 8));
    assert!(wf.preview().is_none());
    assert!(!wf.view().download_enabled);
}

#[tokio::test]
async fn convert_without_source_is_a_no_op() {
    let wf = ConversionWorkflow::new(ConversionConfig::default());
    let before = wf.snapshot();

    let outcome = wf.convert().await.unwrap();
    assert!(matches!(outcome, ConvertOutcome::NoSourceSelected));
    assert_eq!(wf.snapshot(), before);
}

#[test]
fn download_without_artifact_does_not_save() {
    let wf = ConversionWorkflow::new(ConversionConfig::default());
    let sink = RecordingSink::default();

    assert_eq!(wf.download(&sink).unwrap(), None);
    assert!(sink.saves.lock().unwrap().is_empty());
}

#[tokio::test]
async fn repeated_conversion_is_equivalent() {
    let wf = ConversionWorkflow::new(ConversionConfig::default());
    wf.select_file(png_source("a.png", 30, 20));
    wf.select_target_format(TargetFormat::Jpeg);

    let first = converted(wf.convert().await.unwrap());
    let second = converted(wf.convert().await.unwrap());
    assert_eq!(first.format, second.format);
    assert_eq!((first.width, first.height), (second.width, second.height));
}

// ── Scenario: stale artifact after a format change ──────────────────────────

#[tokio::test]
async fn format_change_leaves_stale_artifact_until_reconverted() {
    init_tracing();
    let wf = ConversionWorkflow::new(ConversionConfig::default());
    wf.select_file(png_source("photo.png", 100, 50));

    let artifact = converted(wf.convert().await.unwrap());
    assert_eq!(artifact.format, TargetFormat::Png);
    assert_eq!((artifact.width, artifact.height), (100, 50));

    wf.select_target_format(TargetFormat::Jpeg);
    let view = wf.view();
    assert_eq!(view.preview_format, Some(TargetFormat::Png));
    assert!(view.is_stale());

    // Download still names the file after the artifact's own format.
    let sink = RecordingSink::default();
    assert_eq!(
        wf.download(&sink).unwrap().as_deref(),
        Some("converted-image.png")
    );

    let artifact = converted(wf.convert().await.unwrap());
    assert_eq!(artifact.format, TargetFormat::Jpeg);
    assert!(!wf.view().is_stale());
    assert_eq!(
        wf.download(&sink).unwrap().as_deref(),
        Some("converted-image.jpeg")
    );
    assert_eq!(sink.saves.lock().unwrap().len(), 2);
}

// ── Failure handling ─────────────────────────────────────────────────────────

#[tokio::test]
async fn decode_failure_is_reported_and_keeps_prior_artifact() {
    init_tracing();
    let wf = ConversionWorkflow::new(ConversionConfig::default());
    wf.select_file(png_source("good.png", 5, 5));
    wf.convert().await.unwrap();
    let good = wf.snapshot().artifact().cloned().unwrap();

    // Restore a state whose source is corrupt but whose artifact is still
    // the good one, so the failure happens on the artifact's generation.
    let mut state = WorkflowState::new(TargetFormat::Png);
    let truncated = encoded(32, 32, ImageFormat::Png)[..40].to_vec();
    state.select_file(SourceFile::from_bytes("bad.png", truncated));
    state.publish(good.clone(), state.source_generation());
    let wf = ConversionWorkflow::with_state(ConversionConfig::default(), state);

    let err = wf.convert().await.unwrap_err();
    assert!(matches!(err, ImgConvError::DecodeFailed { .. }), "got: {err}");

    let snapshot = wf.snapshot();
    assert_eq!(snapshot.artifact(), Some(&good));
    assert!(matches!(
        snapshot.last_failure(),
        Some(WorkflowFailure::Decode { .. })
    ));
    assert!(wf.view().error.is_some());
}

#[tokio::test]
async fn missing_file_is_a_read_failure() {
    let wf = ConversionWorkflow::new(ConversionConfig::default());
    wf.select_file(SourceFile::from_path("/no/such/image.png"));

    let err = wf.convert().await.unwrap_err();
    assert!(matches!(err, ImgConvError::FileNotFound { .. }));
    assert!(matches!(
        wf.snapshot().last_failure(),
        Some(WorkflowFailure::Read { .. })
    ));
}

#[tokio::test]
async fn selection_during_conversion_discards_result() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slow.png");
    std::fs::write(&path, encoded(256, 256, ImageFormat::Png)).unwrap();

    let wf = Arc::new(ConversionWorkflow::new(ConversionConfig::default()));
    wf.select_file(SourceFile::from_path(&path));

    let task = {
        let wf = Arc::clone(&wf);
        tokio::spawn(async move { wf.convert().await })
    };
    // Wait until the conversion has taken its snapshot, then switch files.
    while !wf.is_converting() && !task.is_finished() {
        tokio::task::yield_now().await;
    }
    // The read suspends on the blocking pool, so the task is still in flight.
    assert!(!task.is_finished());
    wf.select_file(png_source("other.png", 2, 2));

    let result = task.await.unwrap();
    assert!(
        matches!(result, Err(ImgConvError::SourceChanged)),
        "got: {result:?}"
    );
    assert!(wf.preview().is_none());
    assert_eq!(wf.snapshot().source().unwrap().name(), "other.png");
}

// ── Delivery ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn directory_download_writes_converted_image() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConversionConfig::builder()
        .target_format(TargetFormat::WebP)
        .build()
        .unwrap();
    let wf = ConversionWorkflow::new(config);
    wf.select_file(png_source("a.png", 10, 10));
    let artifact = converted(wf.convert().await.unwrap());

    let sink = DirectorySink::new(dir.path());
    let filename = wf.download(&sink).unwrap().unwrap();
    assert_eq!(filename, "converted-image.webp");

    let written = std::fs::read(dir.path().join(&filename)).unwrap();
    assert_eq!(written, artifact.bytes);
    assert_eq!(image::guess_format(&written).unwrap(), ImageFormat::WebP);
}

#[tokio::test]
async fn jpeg_flattens_transparency_to_black() {
    let transparent = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 0])));
    let mut buf = Vec::new();
    transparent
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();

    let wf = ConversionWorkflow::new(ConversionConfig::default());
    wf.select_file(SourceFile::from_bytes("clear.png", buf));
    wf.select_target_format(TargetFormat::Jpeg);
    let artifact = converted(wf.convert().await.unwrap());

    let rgb = image::load_from_memory(&artifact.bytes).unwrap().to_rgb8();
    let px = rgb.get_pixel(4, 4).0;
    assert!(px.iter().all(|&c| c < 8), "expected near-black, got {px:?}");
}

#[tokio::test]
async fn preview_uri_parses_back_into_artifact() {
    let wf = ConversionWorkflow::new(ConversionConfig::default());
    wf.select_file(png_source("a.png", 12, 6));
    let artifact = converted(wf.convert().await.unwrap());

    let parsed = ConvertedArtifact::from_data_uri(&wf.preview().unwrap()).unwrap();
    assert_eq!(parsed, artifact);
}
