//! Mock transcriber for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transcriber::{TranscribeError, Transcriber, TranscriptFormat, TranscriptLanguage};

#[derive(Default)]
struct Inner {
    /// When set, every call fails fatally with this reason.
    unavailable: RwLock<Option<String>>,
    /// Paths scripted to fail non-fatally.
    failures: RwLock<HashSet<PathBuf>>,
    /// Every path passed to `transcribe`.
    calls: RwLock<Vec<PathBuf>>,
}

/// Mock implementation of the [`Transcriber`] trait.
///
/// Successful calls return the input path with the transcript extension;
/// nothing is written to disk.
#[derive(Clone, Default)]
pub struct MockTranscriber {
    inner: Arc<Inner>,
}

impl MockTranscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`TranscribeError::EngineUnavailable`].
    pub async fn set_unavailable(&self, reason: impl Into<String>) {
        *self.inner.unavailable.write().await = Some(reason.into());
    }

    /// Scripts `path` to fail non-fatally.
    pub async fn set_failure(&self, path: impl Into<PathBuf>) {
        self.inner.failures.write().await.insert(path.into());
    }

    /// Returns every path transcribed so far.
    pub async fn recorded_calls(&self) -> Vec<PathBuf> {
        self.inner.calls.read().await.clone()
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcribe(
        &self,
        path: &Path,
        format: TranscriptFormat,
        _language: TranscriptLanguage,
    ) -> Result<PathBuf, TranscribeError> {
        self.inner.calls.write().await.push(path.to_path_buf());

        if let Some(reason) = self.inner.unavailable.read().await.clone() {
            return Err(TranscribeError::EngineUnavailable { reason });
        }
        if self.inner.failures.read().await.contains(path) {
            return Err(TranscribeError::Failed {
                reason: "scripted failure".to_string(),
                stderr: None,
            });
        }
        Ok(path.with_extension(format.extension()))
    }

    async fn validate(&self) -> Result<(), TranscribeError> {
        match self.inner.unavailable.read().await.clone() {
            Some(reason) => Err(TranscribeError::EngineUnavailable { reason }),
            None => Ok(()),
        }
    }
}
