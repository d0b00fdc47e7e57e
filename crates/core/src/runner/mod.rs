//! Job supervision and stage execution.
//!
//! The [`JobSupervisor`] accepts submissions, allocates a job record and
//! spawns one stage-runner task per job. Each runner drives its job through
//! Fetch → (conditional) Reencode → (conditional) Transcribe, routing fetch
//! progress through the event sink into the job store.
//! Per-item failures are absorbed into record fields; only an unavailable
//! transcription engine or an unexpected internal failure is fatal to a job,
//! and never to the supervisor.

mod config;
mod runner;
mod sink;
mod supervisor;

pub use config::SupervisorConfig;
pub use supervisor::{JobSupervisor, SubmitError, SubmitReceipt, SubmitRequest};
