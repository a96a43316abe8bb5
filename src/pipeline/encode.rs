//! Encoding: surface → self-describing [`ConvertedArtifact`].
//!
//! Encoders run with the `image` crate's defaults. WebP goes through the
//! crate's lossless encoder, the only WebP encoder it ships.

use crate::error::ImgConvError;
use crate::format::TargetFormat;
use crate::output::ConvertedArtifact;
use crate::pipeline::render::Surface;
use std::io::Cursor;
use tracing::debug;

/// Serialise `surface` into `format`, consuming it.
pub fn encode_surface(surface: Surface, format: TargetFormat) -> Result<ConvertedArtifact, ImgConvError> {
    let (width, height) = (surface.width(), surface.height());
    let pixels = surface.export(format);

    let mut bytes = Vec::new();
    pixels
        .write_to(&mut Cursor::new(&mut bytes), format.image_format())
        .map_err(|e| ImgConvError::EncodeFailed {
            format,
            detail: e.to_string(),
        })?;

    debug!("Encoded {}x{} surface → {} bytes {}", width, height, bytes.len(), format);

    Ok(ConvertedArtifact {
        format,
        width,
        height,
        bytes,
    })
}
