//! Read-only progress view served to polling clients.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{JobRecord, JobStatus, TranscriptFailure};

/// A completed file as exposed to clients (no local path).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletedFileView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// A transcript as exposed to clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TranscriptView {
    pub name: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Flattened point-in-time snapshot of a job.
///
/// Derived from a [`JobRecord`]; carries no handles back into the store, so
/// handing it out cannot mutate job state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobProgress {
    pub job_id: String,
    pub status: JobStatus,
    pub total: usize,
    pub completed: usize,
    /// Overall fraction in [0, 1]: `(completed + current_progress) / total`.
    pub progress: f64,
    pub current_title: String,
    pub current_url: String,
    pub failed: Vec<String>,
    pub completed_files: Vec<CompletedFileView>,
    pub transcripts: Vec<TranscriptView>,
    pub transcript_total: usize,
    pub transcript_completed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_started_at: Option<DateTime<Utc>>,
    pub transcript_errors: Vec<TranscriptFailure>,
    pub reencode_total: usize,
    pub reencode_completed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub output_dir: PathBuf,
}

impl From<&JobRecord> for JobProgress {
    fn from(record: &JobRecord) -> Self {
        let progress = if record.total == 0 {
            0.0
        } else {
            (record.completed as f64 + record.current_progress) / record.total as f64
        };

        Self {
            job_id: record.id.clone(),
            status: record.status,
            total: record.total,
            completed: record.completed,
            progress: progress.clamp(0.0, 1.0),
            current_title: record.current_title.clone(),
            current_url: record.current_url.clone(),
            failed: record.failed.clone(),
            completed_files: record
                .completed_files
                .iter()
                .map(|f| CompletedFileView {
                    name: f.name.clone(),
                    thumbnail: f.thumbnail.clone(),
                })
                .collect(),
            transcripts: record
                .transcripts
                .iter()
                .map(|t| TranscriptView {
                    name: t.name.clone(),
                    source: t.source.clone(),
                    path: Some(t.path.clone()),
                })
                .collect(),
            transcript_total: record.transcript_total,
            transcript_completed: record.transcript_completed,
            transcript_started_at: record.transcript_started_at,
            transcript_errors: record.transcript_errors.clone(),
            reencode_total: record.reencode_total,
            reencode_completed: record.reencode_completed,
            error: record.error.clone(),
            output_dir: record.output_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{CompletedFile, JobMode};

    fn record(total: usize) -> JobRecord {
        JobRecord::new(
            "j-1".to_string(),
            total,
            PathBuf::from("/tmp/out"),
            JobMode::default(),
        )
    }

    #[test]
    fn test_progress_fraction() {
        let mut job = record(4);
        job.completed = 1;
        job.current_progress = 0.5;

        let view = JobProgress::from(&job);
        assert_eq!(view.progress, 1.5 / 4.0);
    }

    #[test]
    fn test_progress_zero_total_guard() {
        let job = record(0);
        let view = JobProgress::from(&job);
        assert_eq!(view.progress, 0.0);
    }

    #[test]
    fn test_progress_clamped() {
        let mut job = record(1);
        job.completed = 1;
        job.current_progress = 0.9; // stale in-flight fraction
        let view = JobProgress::from(&job);
        assert_eq!(view.progress, 1.0);
    }

    #[test]
    fn test_view_hides_local_paths_of_completed_files() {
        let mut job = record(1);
        job.completed_files.push(CompletedFile {
            name: "clip.mp4".to_string(),
            thumbnail: None,
            path: Some(PathBuf::from("/srv/media/clip.mp4")),
        });

        let json = serde_json::to_string(&JobProgress::from(&job)).unwrap();
        assert!(json.contains("\"name\":\"clip.mp4\""));
        assert!(!json.contains("/srv/media"));
    }
}
