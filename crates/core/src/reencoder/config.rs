//! Reencoder configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the ffmpeg backed reencoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReencoderConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_binary")]
    pub binary_path: PathBuf,

    /// Video codec for the compatible output.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Audio codec for the compatible output.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Encoder preset.
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant rate factor (0-51, lower is higher quality).
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// FFmpeg log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_binary() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_preset() -> String {
    "veryfast".to_string()
}

fn default_crf() -> u8 {
    23
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for ReencoderConfig {
    fn default() -> Self {
        Self {
            binary_path: default_binary(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            preset: default_preset(),
            crf: default_crf(),
            log_level: default_log_level(),
        }
    }
}
