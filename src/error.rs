use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for scan and aggregation operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that abort a run. Malformed records are never surfaced here.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Segment boundary error at offset {offset}: {reason}")]
    Boundary { offset: usize, reason: String },
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ScanError {
    /// Maps an I/O error raised while touching `path` onto the matching variant.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }

    pub fn boundary(offset: usize, reason: impl Into<String>) -> Self {
        Self::Boundary {
            offset,
            reason: reason.into(),
        }
    }
}
