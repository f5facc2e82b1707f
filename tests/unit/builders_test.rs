//! Tests for the assembler builder

use async_trait::async_trait;
use batch_dispatch::builders::AssemblerBuilder;
use batch_dispatch::config::{DispatchConfig, GateConfig};
use batch_dispatch::core::{
    AppResult, AuditAction, AuditSink, BatchRunIdentity, DispatchError, ExecutionContext,
    InMemoryAuditSink, JobKeyEntry, JobLauncher, TaskDefinition, TaskId, TaskKind,
};
use batch_dispatch::infra::memory::{InMemoryResourceBundle, InMemoryTaskRegistry};
use batch_dispatch::runtime::tokio_spawner::TokioSpawner;

#[derive(Clone)]
struct NoopLauncher;

#[async_trait]
impl JobLauncher for NoopLauncher {
    async fn launch(&self, _ctx: ExecutionContext) -> AppResult<()> {
        Ok(())
    }
}

fn registry() -> InMemoryTaskRegistry {
    let registry = InMemoryTaskRegistry::new();
    let id = TaskId::new("D1", "T1");
    registry.insert(TaskDefinition::new(id.clone(), TaskKind::ShellScript, "/opt/jobs/load.sh"));
    registry.assign_to_batch("B1", id);
    registry
}

#[tokio::test]
async fn test_builder_rejects_invalid_config() {
    let config = DispatchConfig {
        gate: GateConfig {
            enabled: true,
            poll_interval_ms: 0,
        },
        ..DispatchConfig::default()
    };

    let result = AssemblerBuilder::new(
        config,
        registry(),
        NoopLauncher,
        TokioSpawner::new(tokio::runtime::Handle::current()),
    )
    .build();

    match result {
        Err(DispatchError::Configuration(msg)) => assert!(msg.contains("poll_interval_ms")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("invalid config accepted"),
    }
}

#[tokio::test]
async fn test_builder_builds_paused_assembly() {
    let assembler = AssemblerBuilder::new(
        DispatchConfig::default(),
        registry(),
        NoopLauncher,
        TokioSpawner::new(tokio::runtime::Handle::current()),
    )
    .build()
    .unwrap();

    let bundle = InMemoryResourceBundle::with_job_keys(vec![JobKeyEntry::new(
        "JK1",
        TaskId::new("D1", "T1"),
    )]);
    let scheduler = assembler
        .assemble(&BatchRunIdentity::new("D1", "B1"), &bundle)
        .unwrap();

    assert_eq!(scheduler.name(), "B1");
    assert!(scheduler.is_paused());
    assert!(scheduler.is_started());
    assert_eq!(scheduler.unit_names(), vec!["JK1".to_string()]);
}

#[tokio::test]
async fn test_builder_attaches_audit_sink_per_instance() {
    let sink = InMemoryAuditSink::new(64);
    let shared = sink.clone();

    let assembler = AssemblerBuilder::new(
        DispatchConfig::default(),
        registry(),
        NoopLauncher,
        TokioSpawner::new(tokio::runtime::Handle::current()),
    )
    .with_audit(move |_identity| Box::new(shared.clone()) as Box<dyn AuditSink>)
    .build()
    .unwrap();

    let bundle = InMemoryResourceBundle::with_job_keys(vec![JobKeyEntry::new(
        "JK1",
        TaskId::new("D1", "T1"),
    )]);
    let _scheduler = assembler
        .assemble(&BatchRunIdentity::new("D1", "B1"), &bundle)
        .unwrap();

    assert_eq!(sink.events_for(AuditAction::Register).len(), 1);
    assert_eq!(sink.events_for(AuditAction::Pause).len(), 1);
    assert!(sink.events().iter().all(|e| e.scheduler == "B1"));
}
