//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::fetcher::{FetchError, FetchEvent, FetchRequest, Fetcher, ItemMetadata};

#[derive(Default)]
struct Inner {
    /// URL -> failure reason.
    failures: RwLock<HashMap<String, String>>,
    /// URL -> metadata emitted on finish, overriding the derived default.
    metadata: RwLock<HashMap<String, ItemMetadata>>,
    /// Every request this mock received.
    requests: RwLock<Vec<FetchRequest>>,
}

/// Mock implementation of the [`Fetcher`] trait.
///
/// By default every URL succeeds: the mock emits two `Downloading` events
/// followed by `Finished` with metadata derived from the URL's last path
/// segment (extension `.mp3` in audio-only mode, `.mp4` otherwise).
/// Individual URLs can be scripted to fail or to report custom metadata.
#[derive(Clone, Default)]
pub struct MockFetcher {
    inner: Arc<Inner>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `url` to fail with `reason`.
    pub async fn set_failure(&self, url: impl Into<String>, reason: impl Into<String>) {
        self.inner
            .failures
            .write()
            .await
            .insert(url.into(), reason.into());
    }

    /// Scripts the metadata emitted when `url` finishes.
    pub async fn set_metadata(&self, url: impl Into<String>, metadata: ItemMetadata) {
        self.inner.metadata.write().await.insert(url.into(), metadata);
    }

    /// Returns every request received so far.
    pub async fn recorded_requests(&self) -> Vec<FetchRequest> {
        self.inner.requests.read().await.clone()
    }

    fn default_metadata(request: &FetchRequest) -> ItemMetadata {
        let stem: String = request
            .url
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or("item")
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        let ext = if request.audio_only { "mp3" } else { "mp4" };
        let name = format!("{}.{}", stem, ext);
        ItemMetadata {
            filename: Some(name.clone()),
            filepath: Some(request.dest_dir.join(name)),
            title: Some(stem),
            ext: Some(ext.to_string()),
            thumbnail: None,
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(
        &self,
        request: FetchRequest,
        events: mpsc::Sender<FetchEvent>,
    ) -> Result<(), FetchError> {
        self.inner.requests.write().await.push(request.clone());

        let title = format!("title of {}", request.url);
        let _ = events
            .send(FetchEvent::Downloading {
                downloaded_bytes: 512,
                total_bytes: Some(1024),
                title: title.clone(),
                url: request.url.clone(),
            })
            .await;

        if let Some(reason) = self.inner.failures.read().await.get(&request.url) {
            return Err(FetchError::failed(&request.url, reason.clone(), None));
        }

        let _ = events
            .send(FetchEvent::Downloading {
                downloaded_bytes: 1024,
                total_bytes: Some(1024),
                title,
                url: request.url.clone(),
            })
            .await;

        let metadata = self
            .inner
            .metadata
            .read()
            .await
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Self::default_metadata(&request));
        let _ = events.send(FetchEvent::Finished { metadata }).await;

        Ok(())
    }

    async fn validate(&self) -> Result<(), FetchError> {
        Ok(())
    }
}
