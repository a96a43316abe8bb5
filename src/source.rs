//! The user-selected source file.
//!
//! A [`SourceFile`] is an opaque handle: either a path read lazily when the
//! conversion runs, or bytes already in memory (e.g. from a drag-and-drop or
//! clipboard paste in a GUI shell). Its MIME type is informational only;
//! the decoder sniffs the real format from the bytes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the source bytes live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    /// Bytes are read from this path when conversion runs.
    Path(PathBuf),
    /// Bytes are already loaded.
    Memory(#[serde(with = "crate::output::base64_bytes")] Arc<[u8]>),
}

/// A user-selected image file. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    name: String,
    mime_type: Option<String>,
    origin: SourceOrigin,
}

impl SourceFile {
    /// Handle for a file on disk. Nothing is read until conversion.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = image::ImageFormat::from_path(&path)
            .ok()
            .map(|f| f.to_mime_type().to_string());
        Self {
            name,
            mime_type,
            origin: SourceOrigin::Path(path),
        }
    }

    /// Handle for bytes already in memory.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        let mime_type = image::guess_format(&bytes)
            .ok()
            .map(|f| f.to_mime_type().to_string());
        Self {
            name: name.into(),
            mime_type,
            origin: SourceOrigin::Memory(bytes),
        }
    }

    /// Override the informational MIME type (e.g. from a browser `File`).
    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    /// Display name (file name for path sources).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Informational MIME type, if one could be guessed.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn origin(&self) -> &SourceOrigin {
        &self.origin
    }

    /// The backing path, for path sources.
    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            SourceOrigin::Path(p) => Some(p),
            SourceOrigin::Memory(_) => None,
        }
    }
}
