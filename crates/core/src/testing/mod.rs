//! Mock capability implementations for testing.
//!
//! These mocks provide controllable behavior for lifecycle tests: scripted
//! per-item outcomes and recorded calls for assertions.

mod mock_fetcher;
mod mock_reencoder;
mod mock_transcriber;

pub use mock_fetcher::MockFetcher;
pub use mock_reencoder::MockReencoder;
pub use mock_transcriber::MockTranscriber;
