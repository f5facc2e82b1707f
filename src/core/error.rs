//! Error types for batch assembly and scheduler operations.

use thiserror::Error;

use crate::core::model::TaskId;

/// Errors produced while assembling or driving a batch scheduler.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Batch identity or dispatch configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A job key references a task that is not declared for the batch.
    #[error("job key `{job_key}` references undeclared task `{task_id}`")]
    MissingTaskDefinition {
        /// Job key whose task could not be resolved.
        job_key: String,
        /// Task identity the job key points at.
        task_id: TaskId,
    },
    /// The same job key was supplied more than once.
    #[error("duplicate job key `{0}`")]
    DuplicateJobKey(String),
    /// The task registry returned the same task identity twice.
    #[error("duplicate task definition `{0}`")]
    DuplicateTaskDefinition(TaskId),
    /// A job key entry carried an empty key.
    #[error("empty job key")]
    EmptyJobKey,
    /// A job key waits on a predecessor that is not part of the batch run.
    #[error("job key `{job_key}` depends on unknown job key `{predecessor}`")]
    UnknownPredecessor {
        /// Job key declaring the dependency.
        job_key: String,
        /// Predecessor missing from the run.
        predecessor: String,
    },
    /// The predecessor graph loops back onto a job key.
    #[error("job key `{0}` depends on itself through its predecessors")]
    DependencyCycle(String),
    /// Reading task definitions or the resource bundle failed.
    #[error("underlying service error: {0}")]
    Service(#[source] anyhow::Error),
    /// Registering units with the scheduler failed.
    #[error("scheduler initialization error: {0}")]
    SchedulerInit(String),
    /// A predecessor job key finished in a failed state.
    #[error("job key `{job_key}` blocked: predecessor `{predecessor}` failed")]
    PredecessorFailed {
        /// Job key that was refused.
        job_key: String,
        /// Predecessor that failed.
        predecessor: String,
    },
    /// The job execution entry point reported a failure.
    #[error("job key `{job_key}` failed: {reason}")]
    Launch {
        /// Job key whose launch failed.
        job_key: String,
        /// Failure description from the launcher.
        reason: String,
    },
}

impl DispatchError {
    /// Whether this error signals inconsistent task or job key data.
    #[must_use]
    pub const fn is_data_inconsistency(&self) -> bool {
        matches!(
            self,
            Self::MissingTaskDefinition { .. }
                | Self::DuplicateJobKey(_)
                | Self::DuplicateTaskDefinition(_)
                | Self::EmptyJobKey
                | Self::UnknownPredecessor { .. }
                | Self::DependencyCycle(_)
        )
    }
}

/// Application-facing result using anyhow for collaborator contracts.
pub type AppResult<T> = Result<T, anyhow::Error>;
