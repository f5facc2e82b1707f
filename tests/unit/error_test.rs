//! Tests for error types

use batch_dispatch::core::{DispatchError, TaskId};

#[test]
fn test_configuration_error() {
    let err = DispatchError::Configuration("batch id must not be empty".to_string());
    assert_eq!(format!("{}", err), "configuration error: batch id must not be empty");
}

#[test]
fn test_missing_task_definition_error() {
    let err = DispatchError::MissingTaskDefinition {
        job_key: "JK3".to_string(),
        task_id: TaskId::new("D1", "T3"),
    };
    assert_eq!(format!("{}", err), "job key `JK3` references undeclared task `D1:T3`");
    assert!(err.is_data_inconsistency());
}

#[test]
fn test_duplicate_job_key_error() {
    let err = DispatchError::DuplicateJobKey("JK1".to_string());
    assert_eq!(format!("{}", err), "duplicate job key `JK1`");
    assert!(err.is_data_inconsistency());
}

#[test]
fn test_scheduler_init_error() {
    let err = DispatchError::SchedulerInit("trigger `JK1` already registered".to_string());
    assert_eq!(
        format!("{}", err),
        "scheduler initialization error: trigger `JK1` already registered"
    );
    assert!(!err.is_data_inconsistency());
}

#[test]
fn test_predecessor_failed_error() {
    let err = DispatchError::PredecessorFailed {
        job_key: "JK2".to_string(),
        predecessor: "JK1".to_string(),
    };
    assert_eq!(format!("{}", err), "job key `JK2` blocked: predecessor `JK1` failed");
}

#[test]
fn test_dependency_graph_errors() {
    let err = DispatchError::UnknownPredecessor {
        job_key: "JK1".to_string(),
        predecessor: "JK9".to_string(),
    };
    assert_eq!(format!("{}", err), "job key `JK1` depends on unknown job key `JK9`");
    assert!(err.is_data_inconsistency());

    let err = DispatchError::DependencyCycle("JK2".to_string());
    assert_eq!(
        format!("{}", err),
        "job key `JK2` depends on itself through its predecessors"
    );
    assert!(err.is_data_inconsistency());
}
