//! One-shot conversion entry points.
//!
//! These functions run the whole pipeline for a single source without any
//! workflow state: read → decode → blit → encode. [`crate::workflow`] uses
//! [`convert_source`] for its own `convert()` and layers selection state,
//! the in-flight guard and failure recording on top.

use crate::config::ConversionConfig;
use crate::delivery::write_atomic;
use crate::error::ImgConvError;
use crate::format::TargetFormat;
use crate::output::{ConversionOutput, ConversionStats, SourceInfo};
use crate::pipeline::{decode, encode, input, render::Surface};
use crate::source::SourceFile;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert an image file on disk into `config.target_format`.
///
/// # Errors
/// - File not found / permission denied / above `max_source_bytes`
/// - Bytes are not a decodable image
/// - Encoder failure
///
/// # Example
/// ```rust,no_run
/// use edgequake_imgconv::{convert, ConversionConfig, TargetFormat};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConversionConfig::builder()
///     .target_format(TargetFormat::WebP)
///     .build()?;
/// let output = convert("photo.png", &config).await?;
/// println!("{}", output.artifact.data_uri());
/// # Ok(())
/// # }
/// ```
pub async fn convert(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ImgConvError> {
    let source = SourceFile::from_path(path);
    convert_source(&source, config.target_format, config).await
}

/// Convert image bytes already in memory.
pub async fn convert_bytes(
    name: impl Into<String>,
    bytes: impl Into<std::sync::Arc<[u8]>>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ImgConvError> {
    let source = SourceFile::from_bytes(name, bytes);
    convert_source(&source, config.target_format, config).await
}

/// Convert a file and write the encoded bytes to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files; a failed
/// write leaves neither `output_path` nor a temp file behind.
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ImgConvError> {
    let output = convert(input_path, config).await?;
    let path = output_path.as_ref().to_path_buf();

    let write_path = path.clone();
    let bytes = output.artifact.bytes.clone();
    tokio::task::spawn_blocking(move || write_atomic(&write_path, &bytes))
        .await
        .map_err(|e| ImgConvError::Internal(format!("Write task panicked: {}", e)))??;

    info!("Wrote {} bytes to {}", output.artifact.byte_len(), path.display());
    Ok(output)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ImgConvError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ImgConvError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(path, config))
}

/// Read the header of an image file without decoding pixels.
///
/// Only the header is read, so no source size limit applies.
pub async fn inspect(path: impl AsRef<Path>) -> Result<SourceInfo, ImgConvError> {
    let path = path.as_ref().to_path_buf();
    let source = SourceFile::from_path(&path);
    let meta = tokio::fs::metadata(&path)
        .await
        .map_err(|e| input::map_io_error(&path, e))?;

    let name = source.name().to_string();
    let probe_path = path.clone();
    let (format, width, height) =
        tokio::task::spawn_blocking(move || decode::probe_file(&name, &probe_path))
            .await
            .map_err(|e| ImgConvError::Internal(format!("Probe task panicked: {}", e)))??;
    debug!("Probed '{}': {:?} {}x{}", path.display(), format, width, height);

    Ok(SourceInfo {
        name: source.name().to_string(),
        mime_type: source.mime_type().map(str::to_string),
        detected_format: Some(format!("{:?}", format)),
        width,
        height,
        byte_len: meta.len(),
    })
}

/// Run the full pipeline for `source` into `format`.
///
/// The byte read is the single suspension point; decode, blit and encode run
/// together on the blocking pool and the surface is dropped before this
/// returns.
pub(crate) async fn convert_source(
    source: &SourceFile,
    format: TargetFormat,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ImgConvError> {
    let total_start = Instant::now();
    info!("Starting conversion: {} → {}", source.name(), format);

    // ── Step 1: Read source bytes ────────────────────────────────────────
    let read_start = Instant::now();
    let bytes = input::read_source(source, config.max_source_bytes).await?;
    let read_duration_ms = read_start.elapsed().as_millis() as u64;

    // ── Step 2–4: Decode, blit, encode ───────────────────────────────────
    let name = source.name().to_string();
    let codec_config = config.clone();
    let codec_bytes = bytes.clone();
    let codec_start = Instant::now();
    let (artifact, source_format) = tokio::task::spawn_blocking(move || {
        let decoded = decode::decode_image(&name, &codec_bytes, &codec_config)?;
        let source_format = decoded.format;
        let surface = Surface::from_image(decoded.image);
        let artifact = encode::encode_surface(surface, format)?;
        Ok::<_, ImgConvError>((artifact, source_format))
    })
    .await
    .map_err(|e| ImgConvError::Internal(format!("Codec task panicked: {}", e)))??;
    let codec_duration_ms = codec_start.elapsed().as_millis() as u64;
    debug!("Codec stage finished in {}ms", codec_duration_ms);

    let stats = ConversionStats {
        source_bytes: bytes.len() as u64,
        output_bytes: artifact.byte_len() as u64,
        source_format: Some(format!("{:?}", source_format)),
        read_duration_ms,
        codec_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} {}x{} → {} bytes {}, {}ms total",
        source.name(),
        artifact.width,
        artifact.height,
        stats.output_bytes,
        format,
        stats.total_duration_ms
    );

    Ok(ConversionOutput { artifact, stats })
}
