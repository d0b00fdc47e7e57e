//! Trait definition for the transcription capability.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::TranscribeError;
use super::types::{TranscriptFormat, TranscriptLanguage};

/// A capability that produces a transcript file beside an audio file.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Returns the name of this transcriber implementation.
    fn name(&self) -> &str;

    /// Transcribes `path`, returning the path of the written transcript.
    async fn transcribe(
        &self,
        path: &Path,
        format: TranscriptFormat,
        language: TranscriptLanguage,
    ) -> Result<PathBuf, TranscribeError>;

    /// Validates that the transcriber is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscribeError>;
}
