use std::sync::Arc;

use clipfetch_core::{Config, JobStore, JobSupervisor};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<JobStore>,
    supervisor: Arc<JobSupervisor>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<JobStore>, supervisor: Arc<JobSupervisor>) -> Self {
        Self {
            config,
            store,
            supervisor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn supervisor(&self) -> &JobSupervisor {
        &self.supervisor
    }
}
