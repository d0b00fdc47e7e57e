//! Whisper CLI backed transcriber implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::config::TranscriberConfig;
use super::error::TranscribeError;
use super::srt::{fallback_segment, segments_to_srt};
use super::traits::Transcriber;
use super::types::{Segment, TranscriptFormat, TranscriptLanguage};

/// JSON document the engine writes beside the input file.
#[derive(Debug, Deserialize)]
struct EngineOutput {
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Vec<Segment>,
}

/// Transcriber implementation driving the Whisper command line tool.
///
/// The engine check (binary present and answering) runs at most once per
/// instance; the server wires a single shared instance, making the check
/// process-wide. Model loading itself happens inside the engine per run.
pub struct WhisperTranscriber {
    config: TranscriberConfig,
    engine_ready: OnceCell<()>,
}

impl WhisperTranscriber {
    /// Creates a new transcriber with the given configuration.
    pub fn new(config: TranscriberConfig) -> Self {
        Self {
            config,
            engine_ready: OnceCell::new(),
        }
    }

    /// Creates a transcriber with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscriberConfig::default())
    }

    /// Resolves the engine once; every caller after the first winner gets
    /// the memoized result without re-probing.
    async fn ensure_engine(&self) -> Result<(), TranscribeError> {
        self.engine_ready
            .get_or_try_init(|| async {
                debug!("Probing transcription engine {:?}", self.config.binary_path);
                let output = Command::new(&self.config.binary_path)
                    .arg("--help")
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()
                    .await
                    .map_err(|e| TranscribeError::EngineUnavailable {
                        reason: format!(
                            "{} ({})",
                            self.config.binary_path.display(),
                            e
                        ),
                    })?;
                if !output.success() {
                    return Err(TranscribeError::EngineUnavailable {
                        reason: format!("{} exited with {}", self.config.binary_path.display(), output),
                    });
                }
                Ok(())
            })
            .await
            .copied()
    }

    /// Builds the whisper argument list for one file.
    fn build_args(&self, path: &Path, language: TranscriptLanguage) -> Vec<String> {
        let output_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let mut args = vec![
            path.to_string_lossy().to_string(),
            "--model".to_string(),
            self.config.model.clone(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
            "--fp16".to_string(),
            "False".to_string(),
        ];
        if let Some(code) = language.code() {
            args.extend(["--language".to_string(), code.to_string()]);
        }
        args
    }

    /// Renders engine output in the requested format.
    ///
    /// Returns `None` when there is no usable content.
    fn render(output: &EngineOutput, format: TranscriptFormat) -> Option<String> {
        match format {
            TranscriptFormat::Txt => {
                let text = output.text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            TranscriptFormat::Srt => {
                let segments: Vec<Segment> = if output.segments.is_empty() {
                    let text = output.text.trim();
                    if text.is_empty() {
                        return None;
                    }
                    vec![fallback_segment(text)]
                } else {
                    output.segments.clone()
                };
                let content = segments_to_srt(&segments);
                (!content.is_empty()).then_some(content)
            }
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn transcribe(
        &self,
        path: &Path,
        format: TranscriptFormat,
        language: TranscriptLanguage,
    ) -> Result<PathBuf, TranscribeError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(TranscribeError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        self.ensure_engine().await?;

        let args = self.build_args(path, language);
        debug!("Transcribing {:?}", path);
        let output = Command::new(&self.config.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(TranscribeError::Failed {
                reason: format!("whisper exited with {}", output.status),
                stderr: (!stderr.is_empty()).then_some(stderr),
            });
        }

        let json_path = path.with_extension("json");
        let raw = tokio::fs::read_to_string(&json_path).await.map_err(|e| {
            TranscribeError::OutputParse {
                reason: format!("missing engine output {:?}: {}", json_path, e),
            }
        })?;
        if let Err(e) = tokio::fs::remove_file(&json_path).await {
            warn!("Failed to remove engine output {:?}: {}", json_path, e);
        }

        let engine_output: EngineOutput =
            serde_json::from_str(&raw).map_err(|e| TranscribeError::OutputParse {
                reason: e.to_string(),
            })?;

        let content = Self::render(&engine_output, format).ok_or_else(|| {
            TranscribeError::EmptyTranscript {
                path: path.to_path_buf(),
            }
        })?;

        let transcript_path = path.with_extension(format.extension());
        tokio::fs::write(&transcript_path, content).await?;
        Ok(transcript_path)
    }

    async fn validate(&self) -> Result<(), TranscribeError> {
        self.ensure_engine().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_language() {
        let transcriber = WhisperTranscriber::with_defaults();
        let args = transcriber.build_args(Path::new("/audio/a.mp3"), TranscriptLanguage::Ko);
        assert!(args.contains(&"--language".to_string()));
        assert!(args.contains(&"ko".to_string()));
        assert!(args.contains(&"json".to_string()));

        let args = transcriber.build_args(Path::new("/audio/a.mp3"), TranscriptLanguage::Auto);
        assert!(!args.contains(&"--language".to_string()));
    }

    #[test]
    fn test_render_txt() {
        let output = EngineOutput {
            text: "  hello world  ".to_string(),
            segments: vec![],
        };
        assert_eq!(
            WhisperTranscriber::render(&output, TranscriptFormat::Txt).unwrap(),
            "hello world"
        );
    }

    #[test]
    fn test_render_srt_with_segments() {
        let output = EngineOutput {
            text: "hello".to_string(),
            segments: vec![Segment {
                start: 0.0,
                end: 1.0,
                text: "hello".to_string(),
            }],
        };
        let srt = WhisperTranscriber::render(&output, TranscriptFormat::Srt).unwrap();
        assert!(srt.contains("00:00:00,000 --> 00:00:01,000"));
    }

    #[test]
    fn test_render_srt_fallback_segment() {
        let output = EngineOutput {
            text: "only text".to_string(),
            segments: vec![],
        };
        let srt = WhisperTranscriber::render(&output, TranscriptFormat::Srt).unwrap();
        assert!(srt.starts_with("1\n00:00:00,000 --> "));
        assert!(srt.contains("only text"));
    }

    #[test]
    fn test_render_empty_is_none() {
        let output = EngineOutput {
            text: "   ".to_string(),
            segments: vec![],
        };
        assert!(WhisperTranscriber::render(&output, TranscriptFormat::Txt).is_none());
        assert!(WhisperTranscriber::render(&output, TranscriptFormat::Srt).is_none());
    }

    #[tokio::test]
    async fn test_transcribe_missing_input() {
        let transcriber = WhisperTranscriber::with_defaults();
        let result = transcriber
            .transcribe(
                Path::new("/nonexistent/a.mp3"),
                TranscriptFormat::Srt,
                TranscriptLanguage::Auto,
            )
            .await;
        assert!(matches!(result, Err(TranscribeError::InputNotFound { .. })));
    }
}
