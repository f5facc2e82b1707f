//! Batch assembly, scheduling abstractions, and collaborator contracts.

pub mod assembler;
pub mod audit;
pub mod context;
pub mod error;
pub mod executor;
pub mod index;
pub mod model;
pub mod scheduler;
pub mod services;

pub use assembler::{AuditFactory, BatchSchedulerAssembler};
pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use context::ExecutionContext;
pub use error::{AppResult, DispatchError};
pub use executor::{GatedLauncher, JobLauncher};
pub use index::{JobKeyIndex, TaskDefinitionIndex};
pub use model::{
    ArgumentType, BatchRunIdentity, JobKeyEntry, JobStatus, TaskArgument, TaskDefinition, TaskId,
    TaskKind,
};
pub use scheduler::{BatchScheduler, JobDescriptor, OneShotTrigger, ScheduledUnit, Spawn, TriggerState};
pub use services::{ArgumentResolver, ResourceBundle, StatusTracker, TaskRegistry};
