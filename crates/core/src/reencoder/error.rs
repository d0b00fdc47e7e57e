//! Error types for the reencode capability.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during reencoding.
#[derive(Debug, Error)]
pub enum ReencodeError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The reencode process failed.
    #[error("Reencode failed: {reason}")]
    Failed {
        reason: String,
        stderr: Option<String>,
    },

    /// I/O error during reencoding.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReencodeError {
    /// Creates a new failed error with stderr output.
    pub fn failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            stderr,
        }
    }
}
