//! In-memory resource bundle.

use std::sync::Arc;

use crate::core::model::JobKeyEntry;
use crate::core::services::{ArgumentResolver, ResourceBundle, StatusTracker};
use crate::core::AppResult;
use crate::infra::memory::{InMemoryArgumentResolver, InMemoryStatusTracker};

/// Fixed services and job keys for one batch run.
pub struct InMemoryResourceBundle {
    status_tracker: Arc<dyn StatusTracker>,
    argument_resolver: Arc<dyn ArgumentResolver>,
    job_keys: Vec<JobKeyEntry>,
}

impl InMemoryResourceBundle {
    /// Bundle caller-supplied services with a job key list.
    pub fn new(
        status_tracker: Arc<dyn StatusTracker>,
        argument_resolver: Arc<dyn ArgumentResolver>,
        job_keys: Vec<JobKeyEntry>,
    ) -> Self {
        Self {
            status_tracker,
            argument_resolver,
            job_keys,
        }
    }

    /// Bundle fresh in-memory services with a job key list.
    #[must_use]
    pub fn with_job_keys(job_keys: Vec<JobKeyEntry>) -> Self {
        Self::new(
            Arc::new(InMemoryStatusTracker::new()),
            Arc::new(InMemoryArgumentResolver::new()),
            job_keys,
        )
    }
}

impl ResourceBundle for InMemoryResourceBundle {
    fn status_tracker(&self) -> Arc<dyn StatusTracker> {
        Arc::clone(&self.status_tracker)
    }

    fn argument_resolver(&self) -> Arc<dyn ArgumentResolver> {
        Arc::clone(&self.argument_resolver)
    }

    fn job_keys(&self) -> AppResult<Vec<JobKeyEntry>> {
        Ok(self.job_keys.clone())
    }
}
