//! Error types for zipmirror

use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for zipmirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Structural precondition of a reconciliation pass failed
    #[error("Setup error: {0}")]
    Setup(String),

    /// Permission denied for specific path
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Storage full while writing a specific path
    #[error("Disk full while writing {path}")]
    DiskFull { path: PathBuf },

    /// Entry is not a regular file or a readable symlink
    #[error("Unsupported file type: {path}")]
    UnsupportedFileType { path: PathBuf },

    /// HTTP download failed
    #[error("Download failed: {0}")]
    Download(String),

    /// ZIP extraction failed
    #[error("Extraction failed: {0}")]
    Extract(String),

    /// Run log could not be opened. Later write failures are only warned about.
    #[error("Run log error: {path}: {source}")]
    RunLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MirrorError {
    /// Check if this error is related to permissions
    pub fn is_permission_error(&self) -> bool {
        match self {
            MirrorError::PermissionDenied { .. } => true,
            MirrorError::Io(e) => e.kind() == ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Check if this error is related to disk space
    pub fn is_disk_space_error(&self) -> bool {
        matches!(self, MirrorError::DiskFull { .. })
    }

    /// Process exit code for the binary
    pub fn exit_code(&self) -> i32 {
        match self {
            MirrorError::Extract(_) => 2,
            MirrorError::RunLog { .. } => 3,
            _ => 1,
        }
    }

    /// Classify an IO error raised while touching `path`.
    pub fn from_io(path: &Path, error: Error) -> Self {
        if matches!(error.kind(), ErrorKind::PermissionDenied) {
            MirrorError::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else if matches!(error.kind(), ErrorKind::StorageFull)
            || matches!(error.raw_os_error(), Some(28 | 122))
        {
            MirrorError::DiskFull {
                path: path.to_path_buf(),
            }
        } else {
            MirrorError::Io(error)
        }
    }
}
