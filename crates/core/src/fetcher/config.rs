//! Fetcher configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the yt-dlp backed fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_binary")]
    pub binary_path: PathBuf,

    /// Output filename template, in yt-dlp template syntax.
    #[serde(default = "default_template")]
    pub filename_template: String,

    /// Audio bitrate used when extracting audio-only downloads.
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,

    /// Extra arguments appended to every invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_binary() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_template() -> String {
    "%(title)s [%(id)s].%(ext)s".to_string()
}

fn default_audio_quality() -> String {
    "192K".to_string()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            binary_path: default_binary(),
            filename_template: default_template(),
            audio_quality: default_audio_quality(),
            extra_args: Vec::new(),
        }
    }
}
