//! FFmpeg-based reencoder implementation.

use async_trait::async_trait;
use base64::Engine;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use super::config::ReencoderConfig;
use super::error::ReencodeError;
use super::traits::Reencoder;

/// FFmpeg-based reencoder implementation.
pub struct FfmpegReencoder {
    config: ReencoderConfig,
}

impl FfmpegReencoder {
    /// Creates a new reencoder with the given configuration.
    pub fn new(config: ReencoderConfig) -> Self {
        Self { config }
    }

    /// Creates a reencoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ReencoderConfig::default())
    }

    /// Sibling temp path the reencoded output is staged in.
    fn staging_path(path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "reencode".to_string());
        path.with_file_name(format!(".{}.reencode.tmp.mp4", stem))
    }

    /// Final path the replacement lands at (stem kept, mp4 container).
    fn replacement_path(path: &Path) -> PathBuf {
        path.with_extension("mp4")
    }

    /// Builds ffmpeg arguments for the compatibility transcode.
    fn build_reencode_args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c:v".to_string(),
            self.config.video_codec.clone(),
            "-preset".to_string(),
            self.config.preset.clone(),
            "-crf".to_string(),
            self.config.crf.to_string(),
            "-c:a".to_string(),
            self.config.audio_codec.clone(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Runs ffmpeg with `args`, returning the stderr tail on failure.
    async fn run_ffmpeg(&self, args: &[String]) -> Result<(), ReencodeError> {
        let output = Command::new(&self.config.binary_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ReencodeError::FfmpegNotFound {
                    path: self.config.binary_path.clone(),
                },
                _ => ReencodeError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .lines()
                .rev()
                .take(10)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(ReencodeError::failed(
                format!("ffmpeg exited with {}", output.status),
                (!tail.is_empty()).then_some(tail),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Reencoder for FfmpegReencoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn reencode(&self, path: &Path) -> Result<(), ReencodeError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ReencodeError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let staging = Self::staging_path(path);
        let args = self.build_reencode_args(path, &staging);

        debug!("Reencoding {:?} via {:?}", path, staging);
        if let Err(e) = self.run_ffmpeg(&args).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }

        let replacement = Self::replacement_path(path);
        tokio::fs::rename(&staging, &replacement).await?;
        if replacement != path {
            // Container changed: the replacement lives at <stem>.mp4.
            if let Err(e) = tokio::fs::remove_file(path).await {
                warn!("Failed to remove original {:?}: {}", path, e);
            }
        }
        Ok(())
    }

    async fn thumbnail(&self, path: &Path) -> Result<Option<String>, ReencodeError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(None);
        }

        let thumb_path = path.with_file_name(format!(
            ".{}.thumb.jpg",
            path.file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "frame".to_string())
        ));
        let args = vec![
            "-y".to_string(),
            "-ss".to_string(),
            "00:00:01".to_string(),
            "-i".to_string(),
            path.to_string_lossy().to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-vf".to_string(),
            "scale=240:-1".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
            thumb_path.to_string_lossy().to_string(),
        ];

        if let Err(e) = self.run_ffmpeg(&args).await {
            let _ = tokio::fs::remove_file(&thumb_path).await;
            debug!("Thumbnail grab failed for {:?}: {}", path, e);
            return Ok(None);
        }

        let data = tokio::fs::read(&thumb_path).await?;
        let _ = tokio::fs::remove_file(&thumb_path).await;
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        Ok(Some(format!("data:image/jpeg;base64,{}", encoded)))
    }

    async fn validate(&self) -> Result<(), ReencodeError> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|_| ReencodeError::FfmpegNotFound {
                path: self.config.binary_path.clone(),
            })?;

        if !output.status.success() {
            return Err(ReencodeError::FfmpegNotFound {
                path: self.config.binary_path.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_path_is_sibling() {
        let staging = FfmpegReencoder::staging_path(Path::new("/media/insta/reel one.mp4"));
        assert_eq!(staging.parent(), Some(Path::new("/media/insta")));
        assert_eq!(
            staging.file_name().unwrap().to_str().unwrap(),
            ".reel one.reencode.tmp.mp4"
        );
    }

    #[test]
    fn test_replacement_path_keeps_stem() {
        assert_eq!(
            FfmpegReencoder::replacement_path(Path::new("/media/Youtube/a.webm")),
            PathBuf::from("/media/Youtube/a.mp4")
        );
        assert_eq!(
            FfmpegReencoder::replacement_path(Path::new("/media/insta/b.mp4")),
            PathBuf::from("/media/insta/b.mp4")
        );
    }

    #[test]
    fn test_build_reencode_args() {
        let reencoder = FfmpegReencoder::with_defaults();
        let args =
            reencoder.build_reencode_args(Path::new("/in/a.webm"), Path::new("/in/.a.tmp.mp4"));
        assert_eq!(args[0], "-y");
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"aac".to_string()));
        assert!(args.contains(&"+faststart".to_string()));
        assert_eq!(args.last().unwrap(), "/in/.a.tmp.mp4");
    }

    #[tokio::test]
    async fn test_reencode_missing_input() {
        let reencoder = FfmpegReencoder::with_defaults();
        let result = reencoder.reencode(Path::new("/nonexistent/file.webm")).await;
        assert!(matches!(result, Err(ReencodeError::InputNotFound { .. })));
    }
}
