//! clipfetch core: multi-stage media-processing job orchestration.
//!
//! The pipeline fetches media from URLs, optionally reencodes video for
//! playback compatibility, optionally extracts audio transcripts, and keeps
//! a live, poll-friendly progress record for every job. The external tools
//! doing the heavy lifting sit behind the [`fetcher::Fetcher`],
//! [`reencoder::Reencoder`] and [`transcriber::Transcriber`] traits.

pub mod config;
pub mod fetcher;
pub mod job;
pub mod metrics;
pub mod reencoder;
pub mod runner;
pub mod testing;
pub mod transcriber;

pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use fetcher::{FetchError, FetchEvent, FetchRequest, Fetcher, FetcherConfig, YtDlpFetcher};
pub use job::{
    CompletedFile, JobMode, JobProgress, JobRecord, JobStatus, JobStore, TranscriptFailure,
    TranscriptFile,
};
pub use reencoder::{FfmpegReencoder, ReencodeError, Reencoder, ReencoderConfig};
pub use runner::{
    JobSupervisor, SubmitError, SubmitReceipt, SubmitRequest, SupervisorConfig,
};
pub use transcriber::{
    TranscribeError, Transcriber, TranscriberConfig, TranscriptFormat, TranscriptLanguage,
    WhisperTranscriber,
};
