//! Decoding: raw bytes → `DynamicImage`.
//!
//! The container format is sniffed from the magic bytes, never trusted from
//! the file name or MIME type. Decoder limits from the config bound both
//! dimensions and allocations so a crafted header cannot exhaust memory.

use crate::config::ConversionConfig;
use crate::error::ImgConvError;
use crate::pipeline::input::map_io_error;
use image::error::ImageError;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::{BufRead, Cursor, Seek};
use std::path::Path;
use tracing::debug;

/// A decoded raster plus the format the decoder detected.
pub struct Decoded {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

/// Decode `bytes` into a raster at its natural dimensions.
///
/// `name` is only used for error messages.
pub fn decode_image(
    name: &str,
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<Decoded, ImgConvError> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImgConvError::Internal(format!("format sniffing failed: {e}")))?;

    let format = reader.format().ok_or_else(|| ImgConvError::UnsupportedSource {
        name: name.to_string(),
        detail: format!("unrecognised image data (first bytes: {:02x?})", magic(bytes)),
    })?;

    reader.limits(config.decode_limits());
    let image = reader.decode().map_err(|e| map_image_error(name, e))?;

    debug!(
        "Decoded '{}' as {:?} → {}x{} {:?}",
        name,
        format,
        image.width(),
        image.height(),
        image.color()
    );

    Ok(Decoded { image, format })
}

/// Read only the header: detected format and natural dimensions.
pub fn probe_image(name: &str, bytes: &[u8]) -> Result<(ImageFormat, u32, u32), ImgConvError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImgConvError::Internal(format!("format sniffing failed: {e}")))?;
    probe_header(name, reader)
}

/// Header probe straight from disk; only the bytes the decoder needs for
/// the header are read.
pub fn probe_file(name: &str, path: &Path) -> Result<(ImageFormat, u32, u32), ImgConvError> {
    let reader = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|e| map_io_error(path, e))?;
    probe_header(name, reader)
}

fn probe_header<R: BufRead + Seek>(
    name: &str,
    reader: ImageReader<R>,
) -> Result<(ImageFormat, u32, u32), ImgConvError> {
    let format = reader.format().ok_or_else(|| ImgConvError::UnsupportedSource {
        name: name.to_string(),
        detail: "unrecognised image data".into(),
    })?;
    let (w, h) = reader
        .into_dimensions()
        .map_err(|e| map_image_error(name, e))?;
    Ok((format, w, h))
}

fn magic(bytes: &[u8]) -> &[u8] {
    &bytes[..bytes.len().min(4)]
}

fn map_image_error(name: &str, e: ImageError) -> ImgConvError {
    let name = name.to_string();
    match e {
        ImageError::Unsupported(u) => ImgConvError::UnsupportedSource {
            name,
            detail: u.to_string(),
        },
        ImageError::Limits(l) => ImgConvError::LimitsExceeded {
            name,
            detail: l.to_string(),
        },
        other => ImgConvError::DecodeFailed {
            name,
            detail: other.to_string(),
        },
    }
}
