//! Job supervisor: accepts submissions and dispatches stage runners.

use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::fetcher::Fetcher;
use crate::job::{JobMode, JobStore};
use crate::metrics;
use crate::reencoder::Reencoder;
use crate::transcriber::Transcriber;

use super::config::SupervisorConfig;
use super::runner::StageRunner;

/// Request to start a job.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// URLs to fetch. Blank entries are dropped.
    pub urls: Vec<String>,
    /// Output directory; the configured default when absent.
    pub output_dir: Option<PathBuf>,
    /// Processing mode.
    pub mode: JobMode,
}

/// What a successful submission returns, immediately.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub job_id: String,
    pub total: usize,
    pub output_dir: PathBuf,
}

/// Errors surfaced synchronously at submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The submission contained no usable URL.
    #[error("At least one URL is required")]
    NoUrls,

    /// The output directory could not be created or resolved.
    #[error("Failed to prepare output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Accepts job submissions and runs each job on its own task.
///
/// `submit` never blocks on pipeline work: it validates, allocates the
/// record and spawns the runner. Progress is observed exclusively through
/// the job store.
pub struct JobSupervisor {
    config: SupervisorConfig,
    default_output_dir: PathBuf,
    store: Arc<JobStore>,
    fetcher: Arc<dyn Fetcher>,
    reencoder: Arc<dyn Reencoder>,
    transcriber: Arc<dyn Transcriber>,
    shutdown_tx: broadcast::Sender<()>,
}

impl JobSupervisor {
    /// Creates a new supervisor.
    pub fn new(
        config: SupervisorConfig,
        default_output_dir: PathBuf,
        store: Arc<JobStore>,
        fetcher: Arc<dyn Fetcher>,
        reencoder: Arc<dyn Reencoder>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            default_output_dir,
            store,
            fetcher,
            reencoder,
            transcriber,
            shutdown_tx,
        }
    }

    /// The store this supervisor writes to.
    pub fn store(&self) -> Arc<JobStore> {
        Arc::clone(&self.store)
    }

    /// Validates and starts a job, returning its id without waiting for any
    /// stage to run.
    pub async fn submit(&self, request: SubmitRequest) -> Result<SubmitReceipt, SubmitError> {
        let urls: Vec<String> = request
            .urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if urls.is_empty() {
            return Err(SubmitError::NoUrls);
        }

        let output_dir = request
            .output_dir
            .unwrap_or_else(|| self.default_output_dir.clone());
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| SubmitError::OutputDir {
                path: output_dir.clone(),
                source: e,
            })?;
        let output_dir = tokio::fs::canonicalize(&output_dir)
            .await
            .map_err(|e| SubmitError::OutputDir {
                path: output_dir.clone(),
                source: e,
            })?;

        let total = urls.len();
        let job_id = self
            .store
            .create(total, output_dir.clone(), request.mode.clone())
            .await;
        metrics::JOBS_SUBMITTED.inc();
        info!("Submitted job {} with {} URL(s)", job_id, total);

        self.spawn_runner(job_id.clone(), urls, output_dir.clone(), request.mode);

        Ok(SubmitReceipt {
            job_id,
            total,
            output_dir,
        })
    }

    /// Signals all in-flight runners to stop at the next opportunity.
    pub fn shutdown(&self) {
        debug!("Broadcasting shutdown to runners");
        let _ = self.shutdown_tx.send(());
    }

    fn spawn_runner(&self, job_id: String, urls: Vec<String>, output_dir: PathBuf, mode: JobMode) {
        let runner = StageRunner {
            job_id: job_id.clone(),
            urls,
            output_dir,
            mode,
            config: self.config.clone(),
            store: Arc::clone(&self.store),
            fetcher: Arc::clone(&self.fetcher),
            reencoder: Arc::clone(&self.reencoder),
            transcriber: Arc::clone(&self.transcriber),
        };
        let store = Arc::clone(&self.store);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            tokio::select! {
                outcome = std::panic::AssertUnwindSafe(runner.run()).catch_unwind() => {
                    if outcome.is_err() {
                        // A panic anywhere in the pipeline must not leave the
                        // record stuck in a non-terminal status.
                        warn!("Runner for job {} panicked", job_id);
                        metrics::JOBS_FINISHED
                            .with_label_values(&["error"])
                            .inc();
                        store
                            .mutate(&job_id, |job| {
                                job.advance(crate::job::JobStatus::Error);
                                job.error =
                                    Some("Internal failure while processing the job".to_string());
                            })
                            .await;
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Job {} cancelled by shutdown", job_id);
                    store
                        .mutate(&job_id, |job| {
                            job.advance(crate::job::JobStatus::Error);
                            job.error = Some("Cancelled by shutdown".to_string());
                        })
                        .await;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFetcher, MockReencoder, MockTranscriber};

    fn supervisor(dir: &std::path::Path) -> JobSupervisor {
        JobSupervisor::new(
            SupervisorConfig::default(),
            dir.to_path_buf(),
            Arc::new(JobStore::new(16)),
            Arc::new(MockFetcher::new()),
            Arc::new(MockReencoder::new()),
            Arc::new(MockTranscriber::new()),
        )
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_urls() {
        let dir = tempfile::tempdir().unwrap();
        let sup = supervisor(dir.path());

        let result = sup
            .submit(SubmitRequest {
                urls: vec![],
                output_dir: None,
                mode: JobMode::default(),
            })
            .await;
        assert!(matches!(result, Err(SubmitError::NoUrls)));
        assert!(sup.store().is_empty().await, "no record may be created");
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_urls() {
        let dir = tempfile::tempdir().unwrap();
        let sup = supervisor(dir.path());

        let result = sup
            .submit(SubmitRequest {
                urls: vec!["  ".to_string(), "".to_string()],
                output_dir: None,
                mode: JobMode::default(),
            })
            .await;
        assert!(matches!(result, Err(SubmitError::NoUrls)));
    }

    #[tokio::test]
    async fn test_submit_returns_resolved_receipt() {
        let dir = tempfile::tempdir().unwrap();
        let sup = supervisor(dir.path());

        let receipt = sup
            .submit(SubmitRequest {
                urls: vec!["https://a".to_string(), " https://b ".to_string()],
                output_dir: None,
                mode: JobMode::default(),
            })
            .await
            .unwrap();

        assert_eq!(receipt.total, 2);
        assert!(receipt.output_dir.is_absolute());
        assert!(sup.store().get(&receipt.job_id).await.is_some());
    }
}
