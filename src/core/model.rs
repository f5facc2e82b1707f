//! Task, job key, and argument data model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::DispatchError;

/// Composite task identity: a task code scoped to its domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId {
    /// Owning domain.
    pub domain_id: String,
    /// Task code, unique within the domain.
    pub code: String,
}

impl TaskId {
    /// Build a task identity from its domain and code.
    pub fn new(domain_id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain_id, self.code)
    }
}

/// Kind of executable a task definition declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Database stored procedure.
    StoredProcedure,
    /// Unix shell script.
    ShellScript,
    /// Windows cmd script.
    CmdScript,
    /// Executable jar archive.
    ExecutableJar,
    /// Native binary.
    Binary,
}

impl TaskKind {
    /// Stable string form, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StoredProcedure => "stored_procedure",
            Self::ShellScript => "shell_script",
            Self::CmdScript => "cmd_script",
            Self::ExecutableJar => "executable_jar",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stored_procedure" => Ok(Self::StoredProcedure),
            "shell_script" => Ok(Self::ShellScript),
            "cmd_script" => Ok(Self::CmdScript),
            "executable_jar" => Ok(Self::ExecutableJar),
            "binary" => Ok(Self::Binary),
            other => Err(format!("unknown task kind `{other}`")),
        }
    }
}

/// Declarative description of one executable task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Task identity.
    pub id: TaskId,
    /// Free-form description.
    pub description: String,
    /// Executable kind.
    pub kind: TaskKind,
    /// Script or executable path (procedure name for stored procedures).
    pub script_path: String,
    /// User that created the definition.
    pub created_by: String,
    /// User that last modified the definition.
    pub modified_by: String,
}

impl TaskDefinition {
    /// Create a definition with empty description and audit fields.
    pub fn new(id: TaskId, kind: TaskKind, script_path: impl Into<String>) -> Self {
        Self {
            id,
            description: String::new(),
            kind,
            script_path: script_path.into(),
            created_by: String::new(),
            modified_by: String::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set creator and last modifier.
    #[must_use]
    pub fn with_audit(mut self, created_by: impl Into<String>, modified_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self.modified_by = modified_by.into();
        self
    }
}

/// One node of a batch's execution graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobKeyEntry {
    /// Job key, unique within a batch run.
    pub job_key: String,
    /// Task this job key runs.
    pub task_id: TaskId,
    /// Task group the job key was declared in.
    pub group_id: Option<String>,
}

impl JobKeyEntry {
    /// Map a job key to a task.
    pub fn new(job_key: impl Into<String>, task_id: TaskId) -> Self {
        Self {
            job_key: job_key.into(),
            task_id,
            group_id: None,
        }
    }

    /// Record the owning task group.
    #[must_use]
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }
}

/// Identity of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchRunIdentity {
    /// Domain the batch belongs to.
    pub domain_id: String,
    /// Batch identifier.
    pub batch_id: String,
}

impl BatchRunIdentity {
    /// Build an identity.
    pub fn new(domain_id: impl Into<String>, batch_id: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            batch_id: batch_id.into(),
        }
    }

    /// Reject blank domain or batch identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] naming the blank field.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.domain_id.trim().is_empty() {
            return Err(DispatchError::Configuration("domain id must not be empty".into()));
        }
        if self.batch_id.trim().is_empty() {
            return Err(DispatchError::Configuration("batch id must not be empty".into()));
        }
        Ok(())
    }

    /// Name of the scheduler instance built for this run.
    ///
    /// Batch ids are unique across domains, so the batch id alone names the
    /// instance.
    #[must_use]
    pub fn scheduler_name(&self) -> String {
        self.batch_id.clone()
    }
}

impl fmt::Display for BatchRunIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain_id, self.batch_id)
    }
}

/// Completion state of a job key within a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Fired and waiting on its predecessors.
    Pending,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with a failure reason.
    Failed(String),
}

impl JobStatus {
    /// Whether the job key reached a final state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

/// Scope of a task argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentType {
    /// Value fixed at argument definition time.
    Fixed,
    /// Value set per task; the only type whose value a task may override.
    TaskScoped,
    /// Value supplied by the batch at run time.
    BatchScoped,
    /// Value shared by every batch in the domain.
    Global,
}

/// Argument bound to a task, ordered by `sort_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskArgument {
    /// Binding identifier.
    pub uuid: String,
    /// Task the argument is bound to.
    pub task_id: TaskId,
    /// Argument definition identifier.
    pub arg_id: String,
    /// Argument scope.
    pub arg_type: ArgumentType,
    /// Current value, if one is set.
    pub value: Option<String>,
    /// Position in the task's argument list.
    pub sort_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_kind_round_trips_through_str() {
        for kind in [
            TaskKind::StoredProcedure,
            TaskKind::ShellScript,
            TaskKind::CmdScript,
            TaskKind::ExecutableJar,
            TaskKind::Binary,
        ] {
            assert_eq!(kind.as_str().parse::<TaskKind>(), Ok(kind));
        }
        assert!("python".parse::<TaskKind>().is_err());
    }

    #[test]
    fn test_task_kind_serde_matches_as_str() {
        let json = serde_json::to_string(&TaskKind::ExecutableJar).unwrap();
        assert_eq!(json, "\"executable_jar\"");
    }

    #[test]
    fn test_identity_validation() {
        assert!(BatchRunIdentity::new("D1", "B1").validate().is_ok());
        assert!(matches!(
            BatchRunIdentity::new("", "B1").validate(),
            Err(DispatchError::Configuration(_))
        ));
        assert!(matches!(
            BatchRunIdentity::new("D1", "  ").validate(),
            Err(DispatchError::Configuration(_))
        ));
    }

    #[test]
    fn test_scheduler_name_is_batch_id() {
        let identity = BatchRunIdentity::new("D1", "B1");
        assert_eq!(identity.scheduler_name(), "B1");
        assert_eq!(identity.scheduler_name(), identity.scheduler_name());
    }

    #[test]
    fn test_job_status_terminal() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed("exit 1".into()).is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
    }
}
