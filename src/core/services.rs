//! Collaborator contracts consumed by the assembler and by fired jobs.

use std::sync::Arc;

use crate::core::model::{ArgumentType, JobKeyEntry, JobStatus, TaskArgument, TaskDefinition, TaskId};
use crate::core::AppResult;

/// Read access to declared task definitions.
pub trait TaskRegistry: Send + Sync {
    /// All tasks declared in a domain, in registry order.
    ///
    /// # Errors
    ///
    /// Returns the backend failure unchanged.
    fn list_for_domain(&self, domain_id: &str) -> AppResult<Vec<TaskDefinition>>;

    /// Tasks declared in a domain that take part in the given batch.
    ///
    /// # Errors
    ///
    /// Returns the backend failure unchanged.
    fn find_all(&self, domain_id: &str, batch_id: &str) -> AppResult<Vec<TaskDefinition>>;
}

/// Records and queries completion state of job keys within one batch run.
pub trait StatusTracker: Send + Sync {
    /// Current status of a job key, if it has been recorded.
    fn status(&self, job_key: &str) -> Option<JobStatus>;

    /// Record a new status for a job key.
    fn set_status(&self, job_key: &str, status: JobStatus);

    /// Job keys that must complete before `job_key` may run.
    fn predecessors(&self, job_key: &str) -> Vec<String>;
}

/// Resolves and mutates runtime argument values bound to tasks.
pub trait ArgumentResolver: Send + Sync {
    /// Arguments bound to a task, ordered by sort id.
    ///
    /// # Errors
    ///
    /// Returns the backend failure unchanged.
    fn arguments(&self, task_id: &TaskId) -> AppResult<Vec<TaskArgument>>;

    /// Declared type of an argument definition.
    ///
    /// # Errors
    ///
    /// Returns the backend failure unchanged.
    fn argument_type(&self, arg_id: &str) -> AppResult<Option<ArgumentType>>;

    /// Replace the value of a bound argument.
    ///
    /// # Errors
    ///
    /// Fails when the binding is unknown or its type does not accept values.
    fn update_value(&self, uuid: &str, value: &str) -> AppResult<()>;

    /// Move a bound argument to a new position.
    ///
    /// # Errors
    ///
    /// Fails when the binding is unknown.
    fn update_sort(&self, uuid: &str, sort_id: u32) -> AppResult<()>;
}

/// Per-run services and job graph supplied by the caller.
pub trait ResourceBundle {
    /// Status tracker shared by every unit of this run.
    fn status_tracker(&self) -> Arc<dyn StatusTracker>;

    /// Argument resolver shared by every unit of this run.
    fn argument_resolver(&self) -> Arc<dyn ArgumentResolver>;

    /// Job key to task mappings for this run, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the backend failure unchanged.
    fn job_keys(&self) -> AppResult<Vec<JobKeyEntry>>;
}
