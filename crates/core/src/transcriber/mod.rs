//! Transcription capability.
//!
//! The [`Transcriber`] trait turns an audio file into a transcript file.
//! [`WhisperTranscriber`] backs it with the Whisper command line tool; the
//! engine is resolved at most once process-wide since loading a model is
//! expensive.

mod config;
mod error;
mod srt;
mod traits;
mod types;
mod whisper;

pub use config::TranscriberConfig;
pub use error::TranscribeError;
pub use traits::Transcriber;
pub use types::{Segment, TranscriptFormat, TranscriptLanguage};
pub use whisper::WhisperTranscriber;
