//! Prometheus metrics for core components.
//!
//! This module provides counters for job submissions and outcomes and for
//! the per-item work of each pipeline stage.

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

/// Jobs submitted total.
pub static JOBS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("clipfetch_jobs_submitted_total", "Total jobs submitted").unwrap()
});

/// Jobs finished total by terminal status.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clipfetch_jobs_finished_total", "Total jobs finished"),
        &["status"], // "completed", "completed_with_warnings", "error"
    )
    .unwrap()
});

/// Fetch items total by result.
pub static FETCH_ITEMS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clipfetch_fetch_items_total", "Total per-URL fetch attempts"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Reencode attempts total by result.
pub static REENCODES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clipfetch_reencodes_total", "Total per-file reencode attempts"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Transcription attempts total by result.
pub static TRANSCRIPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "clipfetch_transcripts_total",
            "Total per-file transcription attempts",
        ),
        &["result"], // "success", "failed", "fatal"
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(FETCH_ITEMS.clone()),
        Box::new(REENCODES.clone()),
        Box::new(TRANSCRIPTS.clone()),
    ]
}
