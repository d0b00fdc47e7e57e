//! Core job data types.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::transcriber::{TranscriptFormat, TranscriptLanguage};

/// Lifecycle status of a job.
///
/// Statuses only ever move forward: `pending → running → reencoding →
/// transcribing → terminal`. The reencode and transcribe stages are optional
/// and skipped when not applicable. `Error` is reachable from any
/// non-terminal status. Terminal statuses are absorbing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Reencoding,
    Transcribing,
    Completed,
    CompletedWithWarnings,
    Error,
}

impl JobStatus {
    /// Stable string form, matching the serialized representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Reencoding => "reencoding",
            JobStatus::Transcribing => "transcribing",
            JobStatus::Completed => "completed",
            JobStatus::CompletedWithWarnings => "completed_with_warnings",
            JobStatus::Error => "error",
        }
    }

    /// Whether this status admits no further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::CompletedWithWarnings | JobStatus::Error
        )
    }

    /// Position in the stage order, used to reject backward transitions.
    /// Terminal statuses share the final rank.
    fn rank(&self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Running => 1,
            JobStatus::Reencoding => 2,
            JobStatus::Transcribing => 3,
            JobStatus::Completed | JobStatus::CompletedWithWarnings | JobStatus::Error => 4,
        }
    }

    /// Whether a transition from `self` to `next` is allowed.
    pub fn can_advance_to(&self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

/// Submission mode for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMode {
    /// Download the audio track only (implies transcription of the result).
    #[serde(default)]
    pub audio_only: bool,
    /// Transcript file format.
    #[serde(default)]
    pub transcript_format: TranscriptFormat,
    /// Transcription language hint.
    #[serde(default)]
    pub transcript_language: TranscriptLanguage,
    /// Suppress fetch tool output.
    #[serde(default = "default_quiet")]
    pub quiet: bool,
}

fn default_quiet() -> bool {
    true
}

impl Default for JobMode {
    fn default() -> Self {
        Self {
            audio_only: false,
            transcript_format: TranscriptFormat::default(),
            transcript_language: TranscriptLanguage::default(),
            quiet: default_quiet(),
        }
    }
}

/// A successfully fetched item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedFile {
    /// Display name.
    pub name: String,
    /// Thumbnail URL or data URL, when one could be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Local path of the fetched file, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// A produced transcript file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptFile {
    /// Transcript file name.
    pub name: String,
    /// Full path of the transcript.
    pub path: PathBuf,
    /// Display name of the media file it was produced from.
    pub source: String,
}

/// A per-file transcription failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptFailure {
    /// Display name of the file that failed.
    pub file: String,
    /// Failure message.
    pub error: String,
}

/// Mutable state of one job.
///
/// Created by the supervisor at submission, mutated only by the stage runner
/// that owns the job, read concurrently by progress pollers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    /// Number of submitted URLs, fixed at creation.
    pub total: usize,
    /// URLs whose fetch has concluded, success or failure.
    pub completed: usize,
    /// Fractional progress of the in-flight fetch item.
    pub current_progress: f64,
    pub current_title: String,
    pub current_url: String,
    /// URLs whose fetch failed.
    pub failed: Vec<String>,
    pub completed_files: Vec<CompletedFile>,
    pub reencode_total: usize,
    pub reencode_completed: usize,
    pub transcript_total: usize,
    pub transcript_completed: usize,
    pub transcript_started_at: Option<DateTime<Utc>>,
    pub transcripts: Vec<TranscriptFile>,
    pub transcript_errors: Vec<TranscriptFailure>,
    /// Fatal error message, set only when `status` is `Error`.
    pub error: Option<String>,
    /// Resolved output directory, fixed at creation.
    pub output_dir: PathBuf,
    pub mode: JobMode,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    pub(crate) fn new(id: String, total: usize, output_dir: PathBuf, mode: JobMode) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            total,
            completed: 0,
            current_progress: 0.0,
            current_title: String::new(),
            current_url: String::new(),
            failed: Vec::new(),
            completed_files: Vec::new(),
            reencode_total: 0,
            reencode_completed: 0,
            transcript_total: 0,
            transcript_completed: 0,
            transcript_started_at: None,
            transcripts: Vec::new(),
            transcript_errors: Vec::new(),
            error: None,
            output_dir,
            mode,
            created_at: Utc::now(),
        }
    }

    /// Advances the status, enforcing the forward-only state machine.
    ///
    /// Returns `false` (and leaves the record untouched) when the transition
    /// would move backward or out of a terminal state.
    pub fn advance(&mut self, next: JobStatus) -> bool {
        if !self.status.can_advance_to(next) {
            tracing::warn!(
                "Rejected status transition {} -> {} for job {}",
                self.status.as_str(),
                next.as_str(),
                self.id
            );
            return false;
        }
        self.status = next;
        true
    }

    /// Records the conclusion of one fetch item, success or failure.
    pub fn item_concluded(&mut self) {
        self.completed = (self.completed + 1).min(self.total);
        self.current_progress = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> JobRecord {
        JobRecord::new(
            "j-1".to_string(),
            3,
            PathBuf::from("/tmp/out"),
            JobMode::default(),
        )
    }

    #[test]
    fn test_status_forward_only() {
        let mut job = record();
        assert!(job.advance(JobStatus::Running));
        assert!(job.advance(JobStatus::Transcribing));
        // Regression back to an earlier stage is rejected.
        assert!(!job.advance(JobStatus::Running));
        assert_eq!(job.status, JobStatus::Transcribing);
    }

    #[test]
    fn test_status_skips_optional_stages() {
        let mut job = record();
        assert!(job.advance(JobStatus::Running));
        assert!(job.advance(JobStatus::Completed));
    }

    #[test]
    fn test_terminal_is_absorbing() {
        let mut job = record();
        assert!(job.advance(JobStatus::Error));
        assert!(!job.advance(JobStatus::Completed));
        assert_eq!(job.status, JobStatus::Error);
    }

    #[test]
    fn test_error_reachable_from_pending() {
        let mut job = record();
        assert!(job.advance(JobStatus::Error));
    }

    #[test]
    fn test_item_concluded_bounded_by_total() {
        let mut job = record();
        for _ in 0..5 {
            job.item_concluded();
        }
        assert_eq!(job.completed, 3);
        assert_eq!(job.current_progress, 0.0);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&JobStatus::CompletedWithWarnings).unwrap();
        assert_eq!(json, "\"completed_with_warnings\"");
        assert_eq!(JobStatus::CompletedWithWarnings.as_str(), "completed_with_warnings");
    }
}
