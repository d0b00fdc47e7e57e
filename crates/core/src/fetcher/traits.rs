//! Trait definition for the fetch capability.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::FetchError;
use super::types::{FetchEvent, FetchRequest};

/// A capability that downloads one media item per call.
///
/// Progress is streamed over `events` while the call is in flight; the final
/// [`FetchEvent::Finished`] carries the saved item's metadata. A dropped
/// receiver does not abort the fetch.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Fetches one URL, emitting progress events along the way.
    async fn fetch(
        &self,
        request: FetchRequest,
        events: mpsc::Sender<FetchEvent>,
    ) -> Result<(), FetchError>;

    /// Validates that the fetcher is properly configured and ready.
    async fn validate(&self) -> Result<(), FetchError>;
}
