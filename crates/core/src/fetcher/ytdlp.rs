//! yt-dlp backed fetcher implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::config::FetcherConfig;
use super::error::FetchError;
use super::traits::Fetcher;
use super::types::{FetchEvent, FetchRequest, ItemMetadata};

/// Marker prefix for title/url lines requested via `--print`.
const BEGIN_PREFIX: &str = "begin\t";
/// Marker prefix for byte-count lines requested via `--progress-template`.
const PROGRESS_PREFIX: &str = "progress\t";

/// Fetcher implementation driving the `yt-dlp` command line tool.
///
/// One subprocess per URL. Machine-readable progress is requested through
/// tab-separated `--print`/`--progress-template` hooks and the per-item info
/// JSON (`--print-json`), all parsed off stdout line by line.
pub struct YtDlpFetcher {
    config: FetcherConfig,
}

impl YtDlpFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Creates a fetcher with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(FetcherConfig::default())
    }

    /// Platform subdirectory an item is routed into, by URL.
    fn platform_subdir(url: &str) -> Option<&'static str> {
        let lower = url.to_lowercase();
        if lower.contains("instagram.com") || lower.contains("instagr.am") {
            return Some("insta");
        }
        if lower.contains("youtube.com") || lower.contains("youtu.be") {
            return Some("Youtube");
        }
        None
    }

    /// Builds the yt-dlp argument list for one request.
    fn build_args(&self, request: &FetchRequest, output_template: &str) -> Vec<String> {
        let mut args = vec![
            "--newline".to_string(),
            "--no-playlist".to_string(),
            "-o".to_string(),
            output_template.to_string(),
        ];

        if request.audio_only {
            args.extend([
                "-f".to_string(),
                "bestaudio/best".to_string(),
                "-x".to_string(),
                "--audio-format".to_string(),
                "mp3".to_string(),
                "--audio-quality".to_string(),
                self.config.audio_quality.clone(),
            ]);
        } else {
            args.extend([
                "-f".to_string(),
                "bv*[ext=mp4]+ba[ext=m4a]/b[ext=mp4]/bv*+ba/b".to_string(),
                "--merge-output-format".to_string(),
                "mp4".to_string(),
            ]);
        }

        if request.quiet {
            args.extend([
                "-q".to_string(),
                "--no-warnings".to_string(),
                "--progress".to_string(),
            ]);
        }

        // Machine-readable hooks, parsed in fetch().
        args.extend([
            "--print".to_string(),
            format!("before_dl:{}%(title)s\t%(webpage_url)s", BEGIN_PREFIX),
            "--progress-template".to_string(),
            format!(
                "{}%(progress.downloaded_bytes)s\t%(progress.total_bytes,progress.total_bytes_estimate)s",
                PROGRESS_PREFIX
            ),
            "--print-json".to_string(),
        ]);

        args.extend(self.config.extra_args.iter().cloned());
        args.push(request.url.clone());
        args
    }

    /// Parses a `progress\t<downloaded>\t<total>` line into byte counts.
    fn parse_progress_line(line: &str) -> Option<(u64, Option<u64>)> {
        let rest = line.strip_prefix(PROGRESS_PREFIX)?;
        let mut fields = rest.split('\t');
        let downloaded = fields.next()?.trim().parse::<u64>().ok()?;
        let total = fields
            .next()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0);
        Some((downloaded, total))
    }

    /// Extracts item metadata from the info JSON printed after download.
    ///
    /// Field availability varies by extractor, so every probe is optional.
    fn parse_info_json(value: &serde_json::Value) -> ItemMetadata {
        let str_field = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .filter_map(|k| value.get(*k).and_then(|v| v.as_str()))
                .find(|s| !s.is_empty())
                .map(|s| s.to_string())
        };

        let mut filepath = str_field(&["filepath", "_filename", "filename"]).map(PathBuf::from);
        if filepath.is_none() {
            if let Some(requested) = value.get("requested_downloads").and_then(|v| v.as_array()) {
                filepath = requested
                    .iter()
                    .filter_map(|item| {
                        ["filepath", "_filename", "filename"]
                            .iter()
                            .filter_map(|k| item.get(*k).and_then(|v| v.as_str()))
                            .find(|s| !s.is_empty())
                    })
                    .next()
                    .map(PathBuf::from);
            }
        }

        let mut thumbnail = str_field(&["thumbnail"]);
        if thumbnail.is_none() {
            thumbnail = value
                .get("thumbnails")
                .and_then(|v| v.as_array())
                .and_then(|list| list.last())
                .and_then(|t| t.get("url"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
        }

        ItemMetadata {
            filename: filepath
                .as_deref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string()),
            filepath,
            title: str_field(&["fulltitle", "title"]),
            ext: str_field(&["ext"]),
            thumbnail,
        }
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch(
        &self,
        request: FetchRequest,
        events: mpsc::Sender<FetchEvent>,
    ) -> Result<(), FetchError> {
        let base_dir = match Self::platform_subdir(&request.url) {
            Some(subdir) => request.dest_dir.join(subdir),
            None => request.dest_dir.clone(),
        };
        tokio::fs::create_dir_all(&base_dir)
            .await
            .map_err(|_| FetchError::DestinationFailed {
                path: base_dir.clone(),
            })?;

        let output_template = base_dir.join(&self.config.filename_template);
        let args = self.build_args(&request, &output_template.to_string_lossy());

        debug!("Spawning {:?} for {}", self.config.binary_path, request.url);
        let mut child = Command::new(&self.config.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => FetchError::ToolNotFound {
                    path: self.config.binary_path.clone(),
                },
                _ => FetchError::Io(e),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| FetchError::OutputParse {
            reason: "Failed to capture stdout".to_string(),
        })?;
        let stderr = child.stderr.take();

        // Drain stderr in the background, keeping the tail for error reports.
        let stderr_task = tokio::spawn(async move {
            let mut tail: Vec<String> = Vec::new();
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tail.push(line);
                    if tail.len() > 20 {
                        tail.remove(0);
                    }
                }
            }
            tail.join("\n")
        });

        // Matches the human-readable destination announcement, the fallback
        // path source when the info JSON omits filepath fields.
        let destination_re = Regex::new(r"^\[download\] Destination: (.+)$").expect("static regex");

        let mut current_title = String::new();
        let mut metadata: Option<ItemMetadata> = None;
        let mut last_destination: Option<PathBuf> = None;

        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(rest) = line.strip_prefix(BEGIN_PREFIX) {
                let mut fields = rest.split('\t');
                current_title = fields.next().unwrap_or_default().to_string();
                let _ = events
                    .send(FetchEvent::Downloading {
                        downloaded_bytes: 0,
                        total_bytes: None,
                        title: current_title.clone(),
                        url: request.url.clone(),
                    })
                    .await;
            } else if let Some((downloaded, total)) = Self::parse_progress_line(&line) {
                let _ = events
                    .send(FetchEvent::Downloading {
                        downloaded_bytes: downloaded,
                        total_bytes: total,
                        title: current_title.clone(),
                        url: request.url.clone(),
                    })
                    .await;
            } else if line.starts_with('{') {
                match serde_json::from_str::<serde_json::Value>(&line) {
                    Ok(value) => metadata = Some(Self::parse_info_json(&value)),
                    Err(e) => warn!("Unparseable info JSON from yt-dlp: {}", e),
                }
            } else if let Some(captures) = destination_re.captures(&line) {
                last_destination = Some(PathBuf::from(&captures[1]));
            }
        }

        let status = child.wait().await?;
        let stderr_tail = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(FetchError::failed(
                &request.url,
                format!("yt-dlp exited with {}", status),
                (!stderr_tail.is_empty()).then_some(stderr_tail),
            ));
        }

        let mut metadata = metadata.unwrap_or_default();
        if metadata.filepath.is_none() {
            metadata.filepath = last_destination;
        }
        if metadata.title.is_none() && !current_title.is_empty() {
            metadata.title = Some(current_title);
        }
        let _ = events.send(FetchEvent::Finished { metadata }).await;

        Ok(())
    }

    async fn validate(&self) -> Result<(), FetchError> {
        let output = Command::new(&self.config.binary_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|_| FetchError::ToolNotFound {
                path: self.config.binary_path.clone(),
            })?;

        if !output.status.success() {
            return Err(FetchError::ToolNotFound {
                path: self.config.binary_path.clone(),
            });
        }
        Ok(())
    }
}
