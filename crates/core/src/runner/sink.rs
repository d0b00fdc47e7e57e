//! Progress event sink.
//!
//! Normalizes the fetch capability's per-item events into job store
//! mutations, decoupling the tool's callback style from the storage model.

use std::sync::Arc;

use tracing::debug;

use crate::fetcher::FetchEvent;
use crate::job::{CompletedFile, JobStatus, JobStore};

/// Routes fetch events for one job into the store.
#[derive(Clone)]
pub(crate) struct EventSink {
    job_id: String,
    store: Arc<JobStore>,
}

impl EventSink {
    pub(crate) fn new(job_id: String, store: Arc<JobStore>) -> Self {
        Self { job_id, store }
    }

    /// Applies one event to the job record.
    ///
    /// Only transient fields and monotonic counters are touched; terminal
    /// records are left alone by the store itself.
    pub(crate) async fn handle(&self, event: FetchEvent) {
        match event {
            FetchEvent::Downloading {
                downloaded_bytes,
                total_bytes,
                title,
                url,
            } => {
                let ratio = match total_bytes {
                    Some(total) if total > 0 => {
                        (downloaded_bytes as f64 / total as f64).clamp(0.0, 1.0)
                    }
                    _ => 0.0,
                };
                self.store
                    .mutate(&self.job_id, |job| {
                        job.current_title = title;
                        job.current_url = url;
                        job.current_progress = ratio;
                        if job.status == JobStatus::Pending {
                            job.advance(JobStatus::Running);
                        }
                    })
                    .await;
            }
            FetchEvent::Finished { metadata } => {
                let Some(name) = metadata.display_name() else {
                    debug!(
                        "Finished item without resolvable name for job {}, skipping",
                        self.job_id
                    );
                    return;
                };
                let entry = CompletedFile {
                    name,
                    thumbnail: metadata.thumbnail.clone(),
                    path: metadata.resolved_path(),
                };
                self.store
                    .mutate(&self.job_id, |job| {
                        job.current_progress = 1.0;
                        job.completed_files.push(entry);
                    })
                    .await;
            }
        }
    }
}
