//! Output delivery: where a "download" ends up.
//!
//! A UI shell implements [`DownloadSink`] over its own save mechanism (a
//! browser anchor click, a native save dialog). [`DirectorySink`] is the
//! file-system implementation the CLI uses.

use crate::error::ImgConvError;
use crate::output::ConvertedArtifact;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Host capability that saves an artifact under a filename.
pub trait DownloadSink: Send + Sync {
    /// Save `artifact`'s bytes as `filename`.
    fn save(&self, filename: &str, artifact: &ConvertedArtifact) -> Result<(), ImgConvError>;
}

/// Saves downloads into a directory, atomically.
///
/// Bytes go to a temp file in the target directory which is then renamed
/// over the final name, so a reader never sees a half-written image.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path a download named `filename` is saved to.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, filename: &str, artifact: &ConvertedArtifact) -> Result<(), ImgConvError> {
        let path = self.path_for(filename);
        write_atomic(&path, &artifact.bytes)?;
        debug!("Saved {} bytes to {}", artifact.byte_len(), path.display());
        Ok(())
    }
}

/// Write `bytes` to `path` through a temp file in the same directory.
///
/// The parent directory is created if needed. On any failure the temp file
/// is removed and `path` is left untouched.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ImgConvError> {
    let write_err = |source: std::io::Error| ImgConvError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir).map_err(write_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
