//! Mock reencoder for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::reencoder::{ReencodeError, Reencoder};

#[derive(Default)]
struct Inner {
    /// Paths scripted to fail.
    failures: RwLock<HashSet<PathBuf>>,
    /// Path -> thumbnail data URL returned by `thumbnail`.
    thumbnails: RwLock<HashMap<PathBuf, String>>,
    /// Every path passed to `reencode`.
    reencoded: RwLock<Vec<PathBuf>>,
}

/// Mock implementation of the [`Reencoder`] trait.
///
/// Uses the trait's default qualification heuristic; reencode calls succeed
/// unless the path is scripted to fail, and are recorded for assertions.
#[derive(Clone, Default)]
pub struct MockReencoder {
    inner: Arc<Inner>,
}

impl MockReencoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `path` to fail reencoding.
    pub async fn set_failure(&self, path: impl Into<PathBuf>) {
        self.inner.failures.write().await.insert(path.into());
    }

    /// Scripts the thumbnail returned for `path`.
    pub async fn set_thumbnail(&self, path: impl Into<PathBuf>, data_url: impl Into<String>) {
        self.inner
            .thumbnails
            .write()
            .await
            .insert(path.into(), data_url.into());
    }

    /// Returns every path reencoded so far.
    pub async fn recorded_reencodes(&self) -> Vec<PathBuf> {
        self.inner.reencoded.read().await.clone()
    }
}

#[async_trait]
impl Reencoder for MockReencoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn reencode(&self, path: &Path) -> Result<(), ReencodeError> {
        self.inner.reencoded.write().await.push(path.to_path_buf());
        if self.inner.failures.read().await.contains(path) {
            return Err(ReencodeError::failed("scripted failure", None));
        }
        Ok(())
    }

    async fn thumbnail(&self, path: &Path) -> Result<Option<String>, ReencodeError> {
        Ok(self.inner.thumbnails.read().await.get(path).cloned())
    }

    async fn validate(&self) -> Result<(), ReencodeError> {
        Ok(())
    }
}
