//! Types for the transcription capability.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transcript file format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptFormat {
    Txt,
    #[default]
    Srt,
}

impl TranscriptFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            TranscriptFormat::Txt => "txt",
            TranscriptFormat::Srt => "srt",
        }
    }
}

impl fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TranscriptFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "txt" => Ok(TranscriptFormat::Txt),
            "srt" => Ok(TranscriptFormat::Srt),
            other => Err(format!("Unsupported transcript format: {}", other)),
        }
    }
}

/// Transcription language hint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptLanguage {
    /// Let the engine detect the language.
    #[default]
    Auto,
    Ko,
    En,
}

impl TranscriptLanguage {
    /// Language code passed to the engine, `None` for auto-detection.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            TranscriptLanguage::Auto => None,
            TranscriptLanguage::Ko => Some("ko"),
            TranscriptLanguage::En => Some("en"),
        }
    }
}

impl FromStr for TranscriptLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(TranscriptLanguage::Auto),
            "ko" => Ok(TranscriptLanguage::Ko),
            "en" => Ok(TranscriptLanguage::En),
            other => Err(format!("Unsupported transcript language: {}", other)),
        }
    }
}

/// One timed segment of engine output.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Segment {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_round_trip() {
        assert_eq!("srt".parse::<TranscriptFormat>().unwrap(), TranscriptFormat::Srt);
        assert_eq!("txt".parse::<TranscriptFormat>().unwrap(), TranscriptFormat::Txt);
        assert!("vtt".parse::<TranscriptFormat>().is_err());
        assert_eq!(TranscriptFormat::default(), TranscriptFormat::Srt);
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(TranscriptLanguage::Auto.code(), None);
        assert_eq!(TranscriptLanguage::Ko.code(), Some("ko"));
        assert!("fr".parse::<TranscriptLanguage>().is_err());
    }

    #[test]
    fn test_format_serde() {
        let format: TranscriptFormat = serde_json::from_str("\"srt\"").unwrap();
        assert_eq!(format, TranscriptFormat::Srt);
        assert!(serde_json::from_str::<TranscriptFormat>("\"pdf\"").is_err());
    }
}
