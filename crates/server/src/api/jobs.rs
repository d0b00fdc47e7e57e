//! Job API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use clipfetch_core::{
    JobMode, JobProgress, SubmitError, SubmitRequest, TranscriptFormat, TranscriptLanguage,
};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a job
#[derive(Debug, Deserialize)]
pub struct SubmitJobBody {
    /// URLs to fetch. Each entry may itself be a comma or newline separated
    /// blob, as pasted into a textarea.
    pub urls: Vec<String>,
    /// Output directory; server default when absent
    pub output: Option<String>,
    /// Download audio tracks only (implies transcription)
    #[serde(default)]
    pub audio_only: bool,
    /// Transcript format
    #[serde(default)]
    pub transcript_format: TranscriptFormat,
    /// Transcription language hint
    #[serde(default)]
    pub transcript_language: TranscriptLanguage,
    /// Suppress fetch tool output
    #[serde(default = "default_quiet")]
    pub quiet: bool,
}

fn default_quiet() -> bool {
    true
}

/// Response for a submitted job
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub total: usize,
    pub output_dir: PathBuf,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct JobErrorResponse {
    pub error: String,
}

/// Splits textarea-style URL blobs into individual entries.
fn split_urls(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|blob| blob.replace(',', "\n").lines().map(str::to_string).collect::<Vec<_>>())
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect()
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a new job
pub async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitJobBody>,
) -> Result<(StatusCode, Json<SubmitJobResponse>), impl IntoResponse> {
    let request = SubmitRequest {
        urls: split_urls(&body.urls),
        output_dir: body.output.filter(|o| !o.trim().is_empty()).map(PathBuf::from),
        mode: JobMode {
            audio_only: body.audio_only,
            transcript_format: body.transcript_format,
            transcript_language: body.transcript_language,
            quiet: body.quiet,
        },
    };

    match state.supervisor().submit(request).await {
        Ok(receipt) => Ok((
            StatusCode::ACCEPTED,
            Json(SubmitJobResponse {
                job_id: receipt.job_id,
                total: receipt.total,
                output_dir: receipt.output_dir,
            }),
        )),
        Err(e @ SubmitError::NoUrls) => Err((
            StatusCode::BAD_REQUEST,
            Json(JobErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(JobErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// Get progress for a job
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobProgress>, impl IntoResponse> {
    match state.store().progress(&id).await {
        Some(progress) => Ok(Json(progress)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(JobErrorResponse {
                error: format!("Unknown job id: {}", id),
            }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_urls_blob() {
        let blobs = vec!["https://a, https://b\nhttps://c".to_string()];
        assert_eq!(
            split_urls(&blobs),
            vec!["https://a", "https://b", "https://c"]
        );
    }

    #[test]
    fn test_split_urls_drops_blanks() {
        let blobs = vec!["  ".to_string(), "\n,\n".to_string(), "https://a".to_string()];
        assert_eq!(split_urls(&blobs), vec!["https://a"]);
    }

    #[test]
    fn test_submit_body_defaults() {
        let body: SubmitJobBody =
            serde_json::from_str(r#"{"urls": ["https://a"]}"#).unwrap();
        assert!(!body.audio_only);
        assert!(body.quiet);
        assert_eq!(body.transcript_format, TranscriptFormat::Srt);
    }

    #[test]
    fn test_submit_body_rejects_unknown_format() {
        let result = serde_json::from_str::<SubmitJobBody>(
            r#"{"urls": ["https://a"], "transcript_format": "pdf"}"#,
        );
        assert!(result.is_err());
    }
}
