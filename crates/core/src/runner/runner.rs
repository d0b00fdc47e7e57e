//! Stage runner: drives one job through the pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::fetcher::{FetchRequest, Fetcher};
use crate::job::{CompletedFile, JobMode, JobStatus, JobStore, TranscriptFailure, TranscriptFile};
use crate::metrics;
use crate::reencoder::Reencoder;
use crate::transcriber::{TranscribeError, Transcriber};

use super::config::SupervisorConfig;
use super::sink::EventSink;

/// Buffer size for per-item fetch event channels.
const EVENT_BUFFER_SIZE: usize = 32;

/// Error that aborts a job.
#[derive(Debug, thiserror::Error)]
pub(crate) enum RunnerError {
    #[error(transparent)]
    Transcriber(#[from] TranscribeError),
}

/// Executes one job's pipeline on its own task.
///
/// The runner is the only writer of its job's record; everything it learns
/// lands in the store through [`JobStore::mutate`] so pollers always see a
/// consistent snapshot.
pub(crate) struct StageRunner {
    pub(crate) job_id: String,
    pub(crate) urls: Vec<String>,
    pub(crate) output_dir: PathBuf,
    pub(crate) mode: JobMode,
    pub(crate) config: SupervisorConfig,
    pub(crate) store: Arc<JobStore>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) reencoder: Arc<dyn Reencoder>,
    pub(crate) transcriber: Arc<dyn Transcriber>,
}

impl StageRunner {
    /// Runs the pipeline to a terminal status.
    pub(crate) async fn run(self) {
        match self.execute().await {
            Ok(()) => {
                let status = self
                    .store
                    .get(&self.job_id)
                    .await
                    .map(|job| job.status)
                    .unwrap_or(JobStatus::Completed);
                metrics::JOBS_FINISHED
                    .with_label_values(&[status.as_str()])
                    .inc();
                info!("Job {} finished: {}", self.job_id, status.as_str());
            }
            Err(e) => {
                self.fail(e.to_string()).await;
            }
        }
    }

    /// Marks the job failed with `message`. Used for fatal errors only.
    pub(crate) async fn fail(&self, message: String) {
        warn!("Job {} failed: {}", self.job_id, message);
        metrics::JOBS_FINISHED
            .with_label_values(&[JobStatus::Error.as_str()])
            .inc();
        self.store
            .mutate(&self.job_id, |job| {
                job.advance(JobStatus::Error);
                job.error = Some(message);
            })
            .await;
    }

    async fn execute(&self) -> Result<(), RunnerError> {
        self.fetch_stage().await;

        let files = self
            .store
            .get(&self.job_id)
            .await
            .map(|job| job.completed_files)
            .unwrap_or_default();

        if !self.mode.audio_only {
            if self.config.thumbnails {
                self.fill_missing_thumbnails(&files).await;
            }
            if self.config.reencode {
                self.reencode_stage(&files).await;
            }
        }

        if self.mode.audio_only && !files.is_empty() {
            self.transcribe_stage(&files).await?;
        }

        self.finalize().await;
        Ok(())
    }

    /// Fetches every URL, absorbing per-item failures into the record.
    async fn fetch_stage(&self) {
        for url in &self.urls {
            let (tx, mut rx) = mpsc::channel(EVENT_BUFFER_SIZE);
            let sink = EventSink::new(self.job_id.clone(), Arc::clone(&self.store));
            let forwarder = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    sink.handle(event).await;
                }
            });

            let request = FetchRequest {
                url: url.clone(),
                dest_dir: self.output_dir.clone(),
                audio_only: self.mode.audio_only,
                quiet: self.mode.quiet,
            };

            let result = self.fetcher.fetch(request, tx).await;
            // The sender side is gone; let the forwarder drain what's left.
            let _ = forwarder.await;

            match result {
                Ok(()) => {
                    metrics::FETCH_ITEMS.with_label_values(&["success"]).inc();
                }
                Err(e) => {
                    warn!("Fetch failed for {} in job {}: {}", url, self.job_id, e);
                    metrics::FETCH_ITEMS.with_label_values(&["failed"]).inc();
                    let failed_url = url.clone();
                    self.store
                        .mutate(&self.job_id, |job| job.failed.push(failed_url))
                        .await;
                }
            }

            self.store
                .mutate(&self.job_id, |job| job.item_concluded())
                .await;
        }
    }

    /// Grabs a preview frame for fetched files whose source reported no
    /// thumbnail. Best-effort: failures are ignored.
    async fn fill_missing_thumbnails(&self, files: &[CompletedFile]) {
        for file in files {
            if file.thumbnail.is_some() {
                continue;
            }
            let Some(path) = &file.path else { continue };
            match self.reencoder.thumbnail(path).await {
                Ok(Some(data_url)) => {
                    let name = file.name.clone();
                    self.store
                        .mutate(&self.job_id, |job| {
                            if let Some(entry) =
                                job.completed_files.iter_mut().find(|f| f.name == name)
                            {
                                entry.thumbnail = Some(data_url);
                            }
                        })
                        .await;
                }
                Ok(None) => {}
                Err(e) => debug!("Thumbnail grab failed for {:?}: {}", path, e),
            }
        }
    }

    /// Reencodes qualifying files in place. Per-file failures are non-fatal.
    async fn reencode_stage(&self, files: &[CompletedFile]) {
        let qualifying: Vec<PathBuf> = files
            .iter()
            .filter_map(|f| f.path.clone())
            .filter(|p| self.reencoder.needs_reencode(p))
            .collect();
        if qualifying.is_empty() {
            return;
        }

        let total = qualifying.len();
        self.store
            .mutate(&self.job_id, |job| {
                job.advance(JobStatus::Reencoding);
                job.reencode_total = total;
                job.reencode_completed = 0;
            })
            .await;

        for path in &qualifying {
            match self.reencoder.reencode(path).await {
                Ok(()) => {
                    debug!("Reencoded {:?}", path);
                    metrics::REENCODES.with_label_values(&["success"]).inc();
                }
                Err(e) => {
                    warn!("Reencode failed for {:?} in job {}: {}", path, self.job_id, e);
                    metrics::REENCODES.with_label_values(&["failed"]).inc();
                }
            }
            self.store
                .mutate(&self.job_id, |job| job.reencode_completed += 1)
                .await;
        }
    }

    /// Transcribes every fetched file with a known path.
    ///
    /// An unavailable engine is fatal; per-file failures are recorded and
    /// the batch continues.
    async fn transcribe_stage(&self, files: &[CompletedFile]) -> Result<(), RunnerError> {
        let targets: Vec<(String, PathBuf)> = files
            .iter()
            .filter_map(|f| f.path.clone().map(|p| (f.name.clone(), p)))
            .collect();
        if targets.is_empty() {
            return Ok(());
        }

        let total = targets.len();
        self.store
            .mutate(&self.job_id, |job| {
                job.advance(JobStatus::Transcribing);
                job.transcript_total = total;
                job.transcript_completed = 0;
                job.transcript_started_at = Some(Utc::now());
            })
            .await;

        for (source_name, path) in &targets {
            match self
                .transcriber
                .transcribe(path, self.mode.transcript_format, self.mode.transcript_language)
                .await
            {
                Ok(transcript_path) => {
                    metrics::TRANSCRIPTS.with_label_values(&["success"]).inc();
                    let entry = TranscriptFile {
                        name: transcript_path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| transcript_path.to_string_lossy().to_string()),
                        path: transcript_path,
                        source: source_name.clone(),
                    };
                    self.store
                        .mutate(&self.job_id, |job| job.transcripts.push(entry))
                        .await;
                }
                Err(e) if e.is_fatal() => {
                    metrics::TRANSCRIPTS.with_label_values(&["fatal"]).inc();
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(
                        "Transcription failed for {:?} in job {}: {}",
                        path, self.job_id, e
                    );
                    metrics::TRANSCRIPTS.with_label_values(&["failed"]).inc();
                    let failure = TranscriptFailure {
                        file: source_name.clone(),
                        error: e.to_string(),
                    };
                    self.store
                        .mutate(&self.job_id, |job| job.transcript_errors.push(failure))
                        .await;
                }
            }
            self.store
                .mutate(&self.job_id, |job| {
                    job.transcript_completed = (job.transcript_completed + 1).min(job.transcript_total);
                })
                .await;
        }

        Ok(())
    }

    /// Lands the job in its terminal status.
    async fn finalize(&self) {
        self.store
            .mutate(&self.job_id, |job| {
                let terminal = if job.transcript_errors.is_empty() {
                    JobStatus::Completed
                } else {
                    JobStatus::CompletedWithWarnings
                };
                job.advance(terminal);
                job.completed = job.total;
                job.current_progress = 0.0;
            })
            .await;
    }
}
