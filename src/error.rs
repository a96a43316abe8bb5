//! Error types for the edgequake-imgconv library.
//!
//! Two distinct error types reflect two distinct audiences:
//!
//! * [`ImgConvError`] — returned as `Err(ImgConvError)` from every fallible
//!   operation (bad input file, undecodable bytes, overlapping conversion).
//!
//! * [`WorkflowFailure`] — a cloneable, serialisable summary of the last
//!   failed conversion, stored in [`crate::workflow::WorkflowState`] so a UI
//!   shell can render "conversion failed" instead of silently showing nothing.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-imgconv library.
#[derive(Debug, Error)]
pub enum ImgConvError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure while reading the source bytes.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source exceeds the configured byte limit.
    #[error("Source is {size} bytes, above the {limit}-byte limit\nRaise --max-source-bytes if this is intended.")]
    SourceTooLarge { size: u64, limit: u64 },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The bytes are not in any format the decoder recognises.
    #[error("Unsupported source image '{name}': {detail}")]
    UnsupportedSource { name: String, detail: String },

    /// The format was recognised but the data is corrupt or truncated.
    #[error("Failed to decode '{name}': {detail}")]
    DecodeFailed { name: String, detail: String },

    /// Decoding would exceed the configured dimension or allocation limits.
    #[error("Image '{name}' exceeds decoder limits: {detail}")]
    LimitsExceeded { name: String, detail: String },

    // ── Encode errors ─────────────────────────────────────────────────────
    /// The encoder rejected the surface.
    #[error("Failed to encode {format}: {detail}")]
    EncodeFailed {
        format: crate::format::TargetFormat,
        detail: String,
    },

    // ── Workflow errors ───────────────────────────────────────────────────
    /// `convert()` was called while another conversion was still running.
    #[error("A conversion is already in progress")]
    ConversionInProgress,

    /// A new source was selected while this conversion was running; the
    /// result was discarded.
    #[error("Source changed during conversion; result discarded")]
    SourceChanged,

    // ── Parsing errors ────────────────────────────────────────────────────
    /// A string could not be parsed as an image data URI.
    #[error("Invalid image data URI: {reason}")]
    InvalidDataUri { reason: String },

    /// A format name or MIME type is not one of png, jpeg, webp.
    #[error("Unknown target format '{input}' (expected png, jpeg or webp)")]
    UnknownFormat { input: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the downloaded file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Summary of the most recent failed conversion.
///
/// Recorded in [`crate::workflow::WorkflowState::last_failure`] and cleared
/// by the next successful conversion or a new file selection.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowFailure {
    /// Source bytes could not be read.
    #[error("could not read the selected file: {detail}")]
    Read { detail: String },

    /// Source bytes could not be decoded into an image.
    #[error("could not decode the selected file: {detail}")]
    Decode { detail: String },

    /// The decoded image could not be encoded into the target format.
    #[error("could not encode the image: {detail}")]
    Encode { detail: String },

    /// Anything else.
    #[error("conversion failed: {detail}")]
    Other { detail: String },
}

impl From<&ImgConvError> for WorkflowFailure {
    fn from(err: &ImgConvError) -> Self {
        let detail = err.to_string();
        match err {
            ImgConvError::FileNotFound { .. }
            | ImgConvError::PermissionDenied { .. }
            | ImgConvError::ReadFailed { .. }
            | ImgConvError::SourceTooLarge { .. } => WorkflowFailure::Read { detail },
            ImgConvError::UnsupportedSource { .. }
            | ImgConvError::DecodeFailed { .. }
            | ImgConvError::LimitsExceeded { .. } => WorkflowFailure::Decode { detail },
            ImgConvError::EncodeFailed { .. } => WorkflowFailure::Encode { detail },
            _ => WorkflowFailure::Other { detail },
        }
    }
}
