//! Input acquisition: load the selected source's bytes.
//!
//! This is the only place the pipeline suspends on I/O. Path sources are
//! read with `tokio::fs` so the caller's thread is never blocked; memory
//! sources are handed back without copying. The size guard runs on the
//! file's metadata first so an oversized file is rejected before it is read.

use crate::error::ImgConvError;
use crate::source::{SourceFile, SourceOrigin};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Read the raw bytes behind `source`, enforcing `max_bytes`.
pub async fn read_source(source: &SourceFile, max_bytes: u64) -> Result<Arc<[u8]>, ImgConvError> {
    match source.origin() {
        SourceOrigin::Memory(bytes) => {
            check_size(bytes.len() as u64, max_bytes)?;
            debug!("Using in-memory source '{}' ({} bytes)", source.name(), bytes.len());
            Ok(Arc::clone(bytes))
        }
        SourceOrigin::Path(path) => {
            let meta = tokio::fs::metadata(path)
                .await
                .map_err(|e| map_io_error(path, e))?;
            check_size(meta.len(), max_bytes)?;

            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| map_io_error(path, e))?;
            // The file may have grown between stat and read.
            check_size(bytes.len() as u64, max_bytes)?;

            debug!("Read '{}' ({} bytes)", path.display(), bytes.len());
            Ok(Arc::from(bytes))
        }
    }
}

fn check_size(size: u64, limit: u64) -> Result<(), ImgConvError> {
    if size > limit {
        return Err(ImgConvError::SourceTooLarge { size, limit });
    }
    Ok(())
}

pub(crate) fn map_io_error(path: &Path, e: std::io::Error) -> ImgConvError {
    let path = path.to_path_buf();
    match e.kind() {
        ErrorKind::NotFound => ImgConvError::FileNotFound { path },
        ErrorKind::PermissionDenied => ImgConvError::PermissionDenied { path },
        _ => ImgConvError::ReadFailed { path, source: e },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_source_is_shared_not_copied() {
        let src = SourceFile::from_bytes("mem", vec![9u8; 16]);
        let bytes = read_source(&src, 1024).await.unwrap();
        let SourceOrigin::Memory(original) = src.origin() else {
            panic!("expected memory origin");
        };
        assert!(Arc::ptr_eq(&bytes, original));
    }

    #[tokio::test]
    async fn missing_file_maps_to_not_found() {
        let src = SourceFile::from_path("/definitely/not/here.png");
        let err = read_source(&src, 1024).await.unwrap_err();
        assert!(matches!(err, ImgConvError::FileNotFound { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_before_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, vec![0u8; 4096]).unwrap();

        let err = read_source(&SourceFile::from_path(&path), 1024)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ImgConvError::SourceTooLarge { size: 4096, limit: 1024 }),
            "got: {err}"
        );
    }

    #[tokio::test]
    async fn reads_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.bin");
        std::fs::write(&path, b"abc").unwrap();

        let bytes = read_source(&SourceFile::from_path(&path), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"abc");
    }
}
