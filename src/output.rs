//! Conversion results: the artifact, its stats, and source inspection info.

use crate::error::ImgConvError;
use crate::format::TargetFormat;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_DATA_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:(image/[A-Za-z0-9.+-]+);base64,([A-Za-z0-9+/=\s]*)$").unwrap());

/// A self-describing encoded image: format tag, natural dimensions and the
/// encoded bytes.
///
/// Renders as a `data:<mime>;base64,<payload>` URI for previews and can be
/// parsed back with [`ConvertedArtifact::from_data_uri`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedArtifact {
    /// Encoding the bytes are in. Fixed at conversion time.
    pub format: TargetFormat,
    /// Width in pixels, identical to the source's natural width.
    pub width: u32,
    /// Height in pixels, identical to the source's natural height.
    pub height: u32,
    /// Encoded image bytes.
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl ConvertedArtifact {
    /// Embeddable data URI for previews.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }

    /// Download filename: `<stem>.<ext>`, with the extension taken from the
    /// artifact's own format rather than whatever is selected now.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.format.extension())
    }

    /// Size of the encoded payload in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Parse a data URI produced by [`data_uri`](Self::data_uri) (or by a
    /// browser canvas export).
    ///
    /// The dimensions are recovered by reading the image header, so the URI
    /// must contain a well-formed PNG, JPEG or WebP stream.
    pub fn from_data_uri(uri: &str) -> Result<Self, ImgConvError> {
        let caps = RE_DATA_URI
            .captures(uri.trim())
            .ok_or_else(|| ImgConvError::InvalidDataUri {
                reason: "expected 'data:image/<type>;base64,<payload>'".into(),
            })?;

        let format = TargetFormat::from_mime(&caps[1])?;
        let payload: String = caps[2].split_whitespace().collect();
        let bytes = STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| ImgConvError::InvalidDataUri {
                reason: format!("payload is not valid base64: {e}"),
            })?;

        let (width, height) = image::ImageReader::with_format(
            std::io::Cursor::new(&bytes),
            format.image_format(),
        )
        .into_dimensions()
        .map_err(|e| ImgConvError::InvalidDataUri {
            reason: format!("payload is not a readable {format} image: {e}"),
        })?;

        Ok(Self {
            format,
            width,
            height,
            bytes,
        })
    }
}

/// Timing and size figures for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Size of the source file in bytes.
    pub source_bytes: u64,
    /// Size of the encoded artifact in bytes.
    pub output_bytes: u64,
    /// Format the decoder detected, e.g. `"Png"`.
    pub source_format: Option<String>,
    pub read_duration_ms: u64,
    /// Decode + blit + encode, measured on the blocking pool.
    pub codec_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub artifact: ConvertedArtifact,
    pub stats: ConversionStats,
}

/// Header-level facts about a source image, without decoding pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub name: String,
    /// Informational MIME type from the file handle.
    pub mime_type: Option<String>,
    /// Format sniffed from the bytes.
    pub detected_format: Option<String>,
    pub width: u32,
    pub height: u32,
    pub byte_len: u64,
}

/// Serde adapter storing byte buffers as standard base64 strings.
pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        serializer.serialize_str(&STANDARD.encode(bytes.as_ref()))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: From<Vec<u8>>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD
            .decode(s.as_bytes())
            .map(T::from)
            .map_err(serde::de::Error::custom)
    }
}
