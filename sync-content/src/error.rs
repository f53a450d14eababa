//! Error types for sync-content.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing local bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// No file at the given path.
    #[error("local file not found: {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Any other I/O failure.
    #[error("local I/O failed for {}: {message}", path.display())]
    Io {
        /// Path the operation touched.
        path: PathBuf,
        /// Description of the underlying error.
        message: String,
    },
}

impl ContentError {
    /// Classify an I/O error raised while touching `path`.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ContentError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ContentError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        }
    }

    /// Check if the error means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}
