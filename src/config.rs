//! Configuration types for image re-encoding.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Encoder quality knobs are deliberately
//! absent: every target uses the `image` crate's defaults.

use crate::error::ImgConvError;
use crate::format::TargetFormat;
use serde::{Deserialize, Serialize};

/// Filename stem used for downloads: `converted-image.<ext>`.
pub const DEFAULT_FILENAME_STEM: &str = "converted-image";

/// Configuration for a conversion or a [`crate::workflow::ConversionWorkflow`].
///
/// # Example
/// ```rust
/// use edgequake_imgconv::{ConversionConfig, TargetFormat};
///
/// let config = ConversionConfig::builder()
///     .target_format(TargetFormat::WebP)
///     .max_source_bytes(8 * 1024 * 1024)
///     .build()
///     .unwrap();
/// assert_eq!(config.target_format, TargetFormat::WebP);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Target encoding for one-shot conversions, and the initial selection of
    /// a workflow. Default: PNG.
    pub target_format: TargetFormat,

    /// Stem of the download filename. Default: `converted-image`.
    pub filename_stem: String,

    /// Largest source file accepted, in bytes. Default: 64 MiB.
    ///
    /// Checked before decoding so an oversized file never reaches the decoder.
    pub max_source_bytes: u64,

    /// Largest accepted width or height, in pixels. Default: 16 384.
    pub max_image_dimension: u32,

    /// Upper bound on decoder allocations, in bytes. Default: 512 MiB.
    pub max_decode_alloc: u64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            target_format: TargetFormat::default(),
            filename_stem: DEFAULT_FILENAME_STEM.to_string(),
            max_source_bytes: 64 * 1024 * 1024,
            max_image_dimension: 16_384,
            max_decode_alloc: 512 * 1024 * 1024,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Decoder limits derived from this configuration.
    pub fn decode_limits(&self) -> image::Limits {
        let mut limits = image::Limits::default();
        limits.max_image_width = Some(self.max_image_dimension);
        limits.max_image_height = Some(self.max_image_dimension);
        limits.max_alloc = Some(self.max_decode_alloc);
        limits
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn target_format(mut self, format: TargetFormat) -> Self {
        self.config.target_format = format;
        self
    }

    pub fn filename_stem(mut self, stem: impl Into<String>) -> Self {
        self.config.filename_stem = stem.into();
        self
    }

    pub fn max_source_bytes(mut self, bytes: u64) -> Self {
        self.config.max_source_bytes = bytes.max(1024);
        self
    }

    pub fn max_image_dimension(mut self, px: u32) -> Self {
        self.config.max_image_dimension = px.max(1);
        self
    }

    pub fn max_decode_alloc(mut self, bytes: u64) -> Self {
        self.config.max_decode_alloc = bytes;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ImgConvError> {
        let c = &self.config;
        let stem = c.filename_stem.trim();
        if stem.is_empty() {
            return Err(ImgConvError::InvalidConfig(
                "filename stem must not be empty".into(),
            ));
        }
        if stem.contains(['/', '\\']) || stem == "." || stem == ".." {
            return Err(ImgConvError::InvalidConfig(format!(
                "filename stem must be a bare name, got '{}'",
                c.filename_stem
            )));
        }
        if c.max_decode_alloc == 0 {
            return Err(ImgConvError::InvalidConfig(
                "decoder allocation limit must be > 0".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.target_format, TargetFormat::Png);
        assert_eq!(c.filename_stem, "converted-image");
        assert_eq!(c.max_source_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn builder_clamps_limits() {
        let c = ConversionConfig::builder()
            .max_source_bytes(10)
            .max_image_dimension(0)
            .build()
            .unwrap();
        assert_eq!(c.max_source_bytes, 1024);
        assert_eq!(c.max_image_dimension, 1);
    }

    #[test]
    fn builder_rejects_bad_stem() {
        assert!(ConversionConfig::builder().filename_stem("  ").build().is_err());
        assert!(ConversionConfig::builder()
            .filename_stem("../escape")
            .build()
            .is_err());
        assert!(ConversionConfig::builder()
            .filename_stem("holiday")
            .build()
            .is_ok());
    }

    #[test]
    fn builder_rejects_zero_alloc() {
        let err = ConversionConfig::builder()
            .max_decode_alloc(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("allocation"));
    }

    #[test]
    fn decode_limits_follow_config() {
        let c = ConversionConfig::builder()
            .max_image_dimension(640)
            .build()
            .unwrap();
        let limits = c.decode_limits();
        assert_eq!(limits.max_image_width, Some(640));
        assert_eq!(limits.max_image_height, Some(640));
    }
}
