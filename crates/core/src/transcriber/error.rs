//! Error types for the transcription capability.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during transcription.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// The transcription engine could not be loaded at all.
    ///
    /// This is the one fatal variant: without an engine no file in the job
    /// can be transcribed, so the whole job stops.
    #[error("Transcription engine unavailable: {reason}")]
    EngineUnavailable { reason: String },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The engine run failed for one file.
    #[error("Transcription failed: {reason}")]
    Failed {
        reason: String,
        stderr: Option<String>,
    },

    /// The engine produced no usable content.
    #[error("Empty transcript for {path}")]
    EmptyTranscript { path: PathBuf },

    /// The engine's output could not be parsed.
    #[error("Failed to parse engine output: {reason}")]
    OutputParse { reason: String },

    /// I/O error during transcription.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscribeError {
    /// Whether this error aborts the whole job rather than one file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EngineUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_engine_unavailable_is_fatal() {
        assert!(TranscribeError::EngineUnavailable {
            reason: "model missing".to_string()
        }
        .is_fatal());
        assert!(!TranscribeError::EmptyTranscript {
            path: PathBuf::from("/a.mp3")
        }
        .is_fatal());
        assert!(!TranscribeError::Failed {
            reason: "decode error".to_string(),
            stderr: None
        }
        .is_fatal());
    }
}
