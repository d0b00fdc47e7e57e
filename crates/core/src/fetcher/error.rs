//! Error types for the fetch capability.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching one item.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The fetch tool binary was not found.
    #[error("Fetch tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The fetch tool exited with a failure.
    #[error("Fetch failed for {url}: {reason}")]
    Failed {
        url: String,
        reason: String,
        stderr: Option<String>,
    },

    /// The tool's output could not be interpreted.
    #[error("Failed to parse fetch tool output: {reason}")]
    OutputParse { reason: String },

    /// The destination directory could not be created.
    #[error("Failed to create destination directory: {path}")]
    DestinationFailed { path: PathBuf },

    /// I/O error while driving the tool.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Creates a new failed error for `url`.
    pub fn failed(url: impl Into<String>, reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Failed {
            url: url.into(),
            reason: reason.into(),
            stderr,
        }
    }
}
