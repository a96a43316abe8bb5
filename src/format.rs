//! Target encodings supported by the converter.
//!
//! The set is closed on purpose: every variant maps to an encoder the
//! `image` crate ships, so an unsupported target can never reach the
//! pipeline. Free-form input (CLI flags, MIME strings) goes through
//! [`TargetFormat::from_str`] or [`TargetFormat::from_mime`] and fails there.

use crate::error::ImgConvError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encoding the surface is serialised into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// Lossless PNG. (default)
    #[default]
    Png,
    /// Baseline JPEG at encoder-default quality. Alpha is flattened onto black.
    Jpeg,
    /// Lossless WebP.
    WebP,
}

impl TargetFormat {
    /// Every supported target, in selector order.
    pub const ALL: [TargetFormat; 3] = [TargetFormat::Png, TargetFormat::Jpeg, TargetFormat::WebP];

    /// MIME type embedded in the artifact's data URI.
    pub fn mime_type(self) -> &'static str {
        match self {
            TargetFormat::Png => "image/png",
            TargetFormat::Jpeg => "image/jpeg",
            TargetFormat::WebP => "image/webp",
        }
    }

    /// File extension used for downloads. This is the format token itself,
    /// so JPEG saves as `.jpeg`, not `.jpg`.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::WebP => "webp",
        }
    }

    /// Human-readable label for selectors.
    pub fn label(self) -> &'static str {
        match self {
            TargetFormat::Png => "PNG",
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::WebP => "WebP",
        }
    }

    /// Whether the encoding can carry an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, TargetFormat::Jpeg)
    }

    /// The matching `image` crate encoder format.
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            TargetFormat::Png => image::ImageFormat::Png,
            TargetFormat::Jpeg => image::ImageFormat::Jpeg,
            TargetFormat::WebP => image::ImageFormat::WebP,
        }
    }

    /// Parse a MIME type such as `image/webp`.
    pub fn from_mime(mime: &str) -> Result<Self, ImgConvError> {
        let lower = mime.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.mime_type() == lower)
            .ok_or(ImgConvError::UnknownFormat {
                input: mime.to_string(),
            })
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = ImgConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(TargetFormat::Png),
            "jpeg" | "jpg" => Ok(TargetFormat::Jpeg),
            "webp" => Ok(TargetFormat::WebP),
            other if other.starts_with("image/") => Self::from_mime(other),
            _ => Err(ImgConvError::UnknownFormat {
                input: s.to_string(),
            }),
        }
    }
}
