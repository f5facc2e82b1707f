//! In-memory status tracker with a predecessor graph.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::core::model::JobStatus;
use crate::core::services::StatusTracker;

/// Job statuses and predecessor edges for one batch run.
#[derive(Default)]
pub struct InMemoryStatusTracker {
    statuses: RwLock<HashMap<String, JobStatus>>,
    predecessors: RwLock<HashMap<String, Vec<String>>>,
}

impl InMemoryStatusTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `job_key` must wait for `predecessor`.
    pub fn add_dependency(&self, job_key: &str, predecessor: &str) {
        let mut edges = self.predecessors.write();
        let list = edges.entry(job_key.to_owned()).or_default();
        if !list.iter().any(|p| p == predecessor) {
            list.push(predecessor.to_owned());
        }
    }

    /// Whether every given job key has completed.
    pub fn all_completed<'a>(&self, job_keys: impl IntoIterator<Item = &'a str>) -> bool {
        let statuses = self.statuses.read();
        job_keys
            .into_iter()
            .all(|k| matches!(statuses.get(k), Some(JobStatus::Completed)))
    }

    /// Snapshot of every recorded status.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, JobStatus> {
        self.statuses.read().clone()
    }
}

impl StatusTracker for InMemoryStatusTracker {
    fn status(&self, job_key: &str) -> Option<JobStatus> {
        self.statuses.read().get(job_key).cloned()
    }

    fn set_status(&self, job_key: &str, status: JobStatus) {
        self.statuses.write().insert(job_key.to_owned(), status);
    }

    fn predecessors(&self, job_key: &str) -> Vec<String> {
        self.predecessors
            .read()
            .get(job_key)
            .cloned()
            .unwrap_or_default()
    }
}
