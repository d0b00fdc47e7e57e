//! Concurrency-safe in-memory job registry.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::RwLock;
use tracing::debug;

use super::types::{JobMode, JobRecord};
use super::view::JobProgress;

/// Registry of all jobs, keyed by job id.
///
/// All shared access to job state goes through this store: `get` returns a
/// snapshot clone, `mutate` applies a closure under the write lock. Mutations
/// of different jobs contend only on the map lock, never on each other's
/// fields.
///
/// The registry is bounded: once it holds `max_records` jobs, creating a new
/// one evicts the oldest terminal records first. In-flight jobs are never
/// evicted.
pub struct JobStore {
    jobs: RwLock<HashMap<String, JobRecord>>,
    max_records: usize,
}

impl JobStore {
    /// Creates a store retaining at most `max_records` jobs.
    pub fn new(max_records: usize) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            max_records: max_records.max(1),
        }
    }

    /// Allocates a new pending record and returns its id.
    pub async fn create(&self, total: usize, output_dir: PathBuf, mode: JobMode) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let record = JobRecord::new(id.clone(), total, output_dir, mode);

        let mut jobs = self.jobs.write().await;
        if jobs.len() >= self.max_records {
            Self::evict_terminal(&mut jobs, self.max_records);
        }
        jobs.insert(id.clone(), record);
        id
    }

    /// Returns a point-in-time snapshot of the record, if it exists.
    pub async fn get(&self, id: &str) -> Option<JobRecord> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Returns the flattened progress view of the record, if it exists.
    pub async fn progress(&self, id: &str) -> Option<JobProgress> {
        self.jobs.read().await.get(id).map(JobProgress::from)
    }

    /// Applies `f` to the record under the write lock.
    ///
    /// A no-op when the id is unknown (the job may have been evicted) or the
    /// record has reached a terminal status.
    pub async fn mutate<F>(&self, id: &str, f: F)
    where
        F: FnOnce(&mut JobRecord),
    {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(id) {
            Some(record) if record.status.is_terminal() => {
                debug!("Ignoring mutation of terminal job {}", id);
            }
            Some(record) => f(record),
            None => debug!("Ignoring mutation of unknown job {}", id),
        }
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Evicts oldest terminal records until the map is below `cap`.
    fn evict_terminal(jobs: &mut HashMap<String, JobRecord>, cap: usize) {
        let mut terminal: Vec<(String, chrono::DateTime<chrono::Utc>)> = jobs
            .values()
            .filter(|r| r.status.is_terminal())
            .map(|r| (r.id.clone(), r.created_at))
            .collect();
        terminal.sort_by_key(|(_, created_at)| *created_at);

        for (id, _) in terminal {
            if jobs.len() < cap {
                break;
            }
            debug!("Evicting finished job {}", id);
            jobs.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;

    fn mode() -> JobMode {
        JobMode::default()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = JobStore::new(16);
        let id = store.create(2, PathBuf::from("/tmp/out"), mode()).await;

        let record = store.get(&id).await.expect("record should exist");
        assert_eq!(record.status, JobStatus::Pending);
        assert_eq!(record.total, 2);
        assert_eq!(record.completed, 0);
        assert_eq!(record.output_dir, PathBuf::from("/tmp/out"));
    }

    #[tokio::test]
    async fn test_get_unknown_returns_none() {
        let store = JobStore::new(16);
        assert!(store.get("nope").await.is_none());
        assert!(store.progress("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_mutate_applies_under_lock() {
        let store = JobStore::new(16);
        let id = store.create(1, PathBuf::from("/tmp"), mode()).await;

        store
            .mutate(&id, |job| {
                job.advance(JobStatus::Running);
                job.current_progress = 0.5;
            })
            .await;

        let record = store.get(&id).await.unwrap();
        assert_eq!(record.status, JobStatus::Running);
        assert_eq!(record.current_progress, 0.5);
    }

    #[tokio::test]
    async fn test_mutate_unknown_is_noop() {
        let store = JobStore::new(16);
        // Must not panic or create a record.
        store.mutate("ghost", |job| job.completed = 99).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_terminal_record_is_frozen() {
        let store = JobStore::new(16);
        let id = store.create(1, PathBuf::from("/tmp"), mode()).await;

        store
            .mutate(&id, |job| {
                job.advance(JobStatus::Completed);
            })
            .await;
        store.mutate(&id, |job| job.completed = 42).await;

        let record = store.get(&id).await.unwrap();
        assert_eq!(record.completed, 0, "terminal record must not change");
    }

    #[tokio::test]
    async fn test_eviction_prefers_oldest_terminal() {
        let store = JobStore::new(2);
        let done = store.create(1, PathBuf::from("/tmp"), mode()).await;
        let live = store.create(1, PathBuf::from("/tmp"), mode()).await;
        store
            .mutate(&done, |job| {
                job.advance(JobStatus::Completed);
            })
            .await;

        let fresh = store.create(1, PathBuf::from("/tmp"), mode()).await;

        assert!(store.get(&done).await.is_none(), "terminal job evicted");
        assert!(store.get(&live).await.is_some(), "in-flight job kept");
        assert!(store.get(&fresh).await.is_some());
    }

    #[tokio::test]
    async fn test_eviction_never_touches_running_jobs() {
        let store = JobStore::new(2);
        let a = store.create(1, PathBuf::from("/tmp"), mode()).await;
        let b = store.create(1, PathBuf::from("/tmp"), mode()).await;

        // No terminal records to evict: the map grows past the cap instead.
        let c = store.create(1, PathBuf::from("/tmp"), mode()).await;

        assert!(store.get(&a).await.is_some());
        assert!(store.get(&b).await.is_some());
        assert!(store.get(&c).await.is_some());
        assert_eq!(store.len().await, 3);
    }
}
